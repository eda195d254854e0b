use openapi_from_annotations::route::{Request, RequestHandler, Response};

#[route(name = "home", path = "/", methods = ["GET"], priority = 1)]
#[operation(summary = "Landing page", tags = ["pages"])]
#[derive(Default)]
pub struct Home;

impl RequestHandler for Home {
    fn handle(&self, _request: Request) -> Response {
        Response::new(b"Welcome".to_vec())
    }
}
