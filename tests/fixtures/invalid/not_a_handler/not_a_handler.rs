#[route(name = "home", path = "/", methods = ["GET"])]
pub struct NotAHandler;

impl NotAHandler {
    pub fn handle(&self) -> &'static str {
        "not a request handler"
    }
}
