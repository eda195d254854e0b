//! Route records and the capability contracts of the objects they hold.

use crate::document::{Mapping, Node};
use std::fmt;
use std::sync::Arc;

pub type Request = http::Request<Vec<u8>>;
pub type Response = http::Response<Vec<u8>>;

/// Trait name a route source must implement
pub const REQUEST_HANDLER: &str = "RequestHandler";
/// Trait name a middleware must implement
pub const MIDDLEWARE: &str = "Middleware";

/// Capability contract of a route's request handler
pub trait RequestHandler: Send + Sync {
    fn handle(&self, request: Request) -> Response;
}

/// Capability contract of a route middleware
pub trait Middleware: Send + Sync {
    fn process(&self, request: Request, next: &dyn RequestHandler) -> Response;
}

/// A compiled route.
///
/// Handler and middleware instances are either shared with an injection container or
/// owned by the route alone; both are held through `Arc`.
#[derive(Clone)]
pub struct Route {
    name: String,
    path: String,
    methods: Vec<String>,
    handler_type: String,
    request_handler: Arc<dyn RequestHandler>,
    middlewares: Vec<Arc<dyn Middleware>>,
    attributes: Mapping,
}

impl Route {
    pub fn new(
        name: String,
        path: String,
        methods: Vec<String>,
        handler_type: String,
        request_handler: Arc<dyn RequestHandler>,
        middlewares: Vec<Arc<dyn Middleware>>,
        attributes: Mapping,
    ) -> Self {
        Self {
            name,
            path,
            methods,
            handler_type,
            request_handler,
            middlewares,
            attributes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The path template, e.g. `/users/{id<\d+>}`
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    /// Name of the type that declared this route
    pub fn handler_type(&self) -> &str {
        &self.handler_type
    }

    pub fn request_handler(&self) -> &Arc<dyn RequestHandler> {
        &self.request_handler
    }

    pub fn middlewares(&self) -> &[Arc<dyn Middleware>] {
        &self.middlewares
    }

    pub fn attributes(&self) -> &Mapping {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&Node> {
        self.attributes.get(key)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("methods", &self.methods)
            .field("handler_type", &self.handler_type)
            .field("middlewares", &self.middlewares.len())
            .field("attributes", &self.attributes)
            .finish()
    }
}

/// Ordered, read-only collection of routes
#[derive(Debug, Clone, Default)]
pub struct RouteCollection {
    routes: Vec<Route>,
}

impl RouteCollection {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Route> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// First route with the given name.
    pub fn get(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.routes.iter().map(Route::name).collect()
    }
}

impl<'a> IntoIterator for &'a RouteCollection {
    type Item = &'a Route;
    type IntoIter = std::slice::Iter<'a, Route>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.iter()
    }
}

impl IntoIterator for RouteCollection {
    type Item = Route;
    type IntoIter = std::vec::IntoIter<Route>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.into_iter()
    }
}
