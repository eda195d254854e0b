use openapi_from_annotations::route::{Request, RequestHandler, Response};

#[route(
    name = "users.update",
    path = "/users/{id<\\d+>}",
    methods = ["PUT", "PATCH"],
    middlewares = [Authenticate],
)]
#[operation(
    summary = "Update a user",
    requestBody = { "$ref" = reference(requestBodies, UserUpdate) },
    responses = { 200 = { "$ref" = reference(responses, UserFound) } },
)]
#[derive(Default)]
pub struct UpdateUser;

impl RequestHandler for UpdateUser {
    fn handle(&self, request: Request) -> Response {
        Response::new(request.into_body())
    }
}
