use crate::helpers::not_found;
use openapi_from_annotations::route::{Request, RequestHandler, Response};

#[route(
    name = "users.show",
    path = "/users/{id<\\d+>}(/{slug})",
    methods = ["GET", "HEAD"],
    priority = 5,
    middlewares = [crate::middleware::Authenticate],
    attributes = { section = "users" },
)]
#[operation(
    summary = "Show a user",
    tags = ["users"],
    security = [{ bearer = [] }],
    responses = {
        200 = { "$ref" = reference(responses, UserFound) },
        404 = { description = "No such user" },
    },
)]
#[derive(Default)]
pub struct ShowUser;

impl RequestHandler for ShowUser {
    fn handle(&self, _request: Request) -> Response {
        not_found()
    }
}
