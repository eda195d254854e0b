use openapi_from_annotations::route::{Request, RequestHandler, Response};

#[route(name = "home", path = "/", methods = ["HEAD", ["GET"], "POST"])]
pub struct MethodsNotStringable;

impl RequestHandler for MethodsNotStringable {
    fn handle(&self, _request: Request) -> Response {
        Response::new(Vec::new())
    }
}
