use openapi_from_annotations::route::{Middleware, Request, RequestHandler, Response};

#[derive(Default)]
pub struct Authenticate;

impl Middleware for Authenticate {
    fn process(&self, request: Request, next: &dyn RequestHandler) -> Response {
        if request.headers().contains_key(http::header::AUTHORIZATION) {
            next.handle(request)
        } else {
            let mut response = Response::new(Vec::new());
            *response.status_mut() = http::StatusCode::UNAUTHORIZED;
            response
        }
    }
}
