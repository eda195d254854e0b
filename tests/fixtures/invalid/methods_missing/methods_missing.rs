use openapi_from_annotations::route::{Request, RequestHandler, Response};

#[route(name = "home", path = "/")]
pub struct MethodsMissing;

impl RequestHandler for MethodsMissing {
    fn handle(&self, _request: Request) -> Response {
        Response::new(Vec::new())
    }
}
