use openapi_from_annotations::route::Response;

pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

pub fn not_found() -> Response {
    let mut response = Response::new(Vec::new());
    *response.status_mut() = http::StatusCode::NOT_FOUND;
    response
}
