use openapi_from_annotations::route::{Request, RequestHandler, Response};

#[route(name = "home", path = "/", methods = ["GET"])]
pub struct Home;

impl RequestHandler for Home {
    fn handle(&self, _request: Request) -> Response {
        Response::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    struct Fixture;
}
