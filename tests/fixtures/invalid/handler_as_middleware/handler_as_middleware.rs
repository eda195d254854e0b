use openapi_from_annotations::route::{Request, RequestHandler, Response};

#[route(name = "dashboard", path = "/dashboard", methods = ["GET"], middlewares = [Login])]
pub struct Dashboard;

impl RequestHandler for Dashboard {
    fn handle(&self, _request: Request) -> Response {
        Response::new(Vec::new())
    }
}

pub struct Login;

impl RequestHandler for Login {
    fn handle(&self, _request: Request) -> Response {
        Response::new(b"login".to_vec())
    }
}
