//! Instantiation of handler and middleware types.
//!
//! Two [`InstanceResolver`] implementations exist. A [`Container`] hands out shared
//! instances the application created itself. [`Constructors`] builds a fresh instance from
//! a default constructor registered for the type, or, in unbound mode, an inert stand-in
//! for any type (used when documentation is generated outside the application).

use crate::error::{Error, Result};
use crate::route::{Middleware, Request, RequestHandler, Response, MIDDLEWARE, REQUEST_HANDLER};
use log::debug;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// An object obtained for a type name
#[derive(Clone)]
pub enum Instance {
    Handler(Arc<dyn RequestHandler>),
    Middleware(Arc<dyn Middleware>),
    /// No real object exists, the name is only declared
    Unbound(String),
}

impl Instance {
    /// Uses the instance as a request handler.
    pub fn into_handler(self, type_name: &str) -> Result<Arc<dyn RequestHandler>> {
        match self {
            Instance::Handler(handler) => Ok(handler),
            Instance::Unbound(name) => Ok(Arc::new(UnboundHandler::new(name))),
            Instance::Middleware(_) => Err(Error::CapabilityMismatch {
                type_name: type_name.to_string(),
                capability: REQUEST_HANDLER,
            }),
        }
    }

    /// Uses the instance as a middleware.
    pub fn into_middleware(self, type_name: &str) -> Result<Arc<dyn Middleware>> {
        match self {
            Instance::Middleware(middleware) => Ok(middleware),
            Instance::Unbound(_) => Ok(Arc::new(UnboundMiddleware)),
            Instance::Handler(_) => Err(Error::CapabilityMismatch {
                type_name: type_name.to_string(),
                capability: MIDDLEWARE,
            }),
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instance::Handler(_) => f.write_str("Instance::Handler"),
            Instance::Middleware(_) => f.write_str("Instance::Middleware"),
            Instance::Unbound(name) => write!(f, "Instance::Unbound({})", name),
        }
    }
}

/// Read-only capability supplying instances by type name
pub trait InstanceResolver {
    /// Whether this resolver can supply `type_name`.
    fn has(&self, type_name: &str) -> bool;

    /// Supplies an instance of `type_name`.
    fn get(&self, type_name: &str) -> Result<Instance>;
}

/// The name instances of `T` are registered under: its path without the module prefix.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Registry of shared instances
#[derive(Clone, Default)]
pub struct Container {
    instances: HashMap<String, Instance>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a shared handler under the name of its type.
    pub fn with_handler<T: RequestHandler + 'static>(mut self, handler: T) -> Self {
        self.insert(short_type_name::<T>(), Instance::Handler(Arc::new(handler)));
        self
    }

    /// Registers a shared middleware under the name of its type.
    pub fn with_middleware<T: Middleware + 'static>(mut self, middleware: T) -> Self {
        self.insert(short_type_name::<T>(), Instance::Middleware(Arc::new(middleware)));
        self
    }

    pub fn insert(&mut self, type_name: impl Into<String>, instance: Instance) {
        self.instances.insert(type_name.into(), instance);
    }
}

impl InstanceResolver for Container {
    fn has(&self, type_name: &str) -> bool {
        self.instances.contains_key(type_name)
    }

    fn get(&self, type_name: &str) -> Result<Instance> {
        self.instances
            .get(type_name)
            .cloned()
            .ok_or_else(|| Error::Instantiation {
                type_name: type_name.to_string(),
                reason: "the container holds no instance of it".to_string(),
            })
    }
}

/// Default constructors by type name
#[derive(Clone, Default)]
pub struct Constructors {
    table: HashMap<String, fn() -> Instance>,
    unbound: bool,
}

impl Constructors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructors that fall back to inert stand-ins for unregistered types.
    pub fn unbound() -> Self {
        Self {
            table: HashMap::new(),
            unbound: true,
        }
    }

    pub fn handler<T: RequestHandler + Default + 'static>(mut self) -> Self {
        self.table.insert(short_type_name::<T>().to_string(), || {
            Instance::Handler(Arc::new(T::default()))
        });
        self
    }

    pub fn middleware<T: Middleware + Default + 'static>(mut self) -> Self {
        self.table.insert(short_type_name::<T>().to_string(), || {
            Instance::Middleware(Arc::new(T::default()))
        });
        self
    }
}

impl InstanceResolver for Constructors {
    fn has(&self, type_name: &str) -> bool {
        self.unbound || self.table.contains_key(type_name)
    }

    fn get(&self, type_name: &str) -> Result<Instance> {
        if let Some(construct) = self.table.get(type_name) {
            debug!("Default-constructing {}", type_name);
            return Ok(construct());
        }
        if self.unbound {
            return Ok(Instance::Unbound(type_name.to_string()));
        }
        Err(Error::Instantiation {
            type_name: type_name.to_string(),
            reason: "no default constructor is registered".to_string(),
        })
    }
}

/// Stand-in handler of a declared but unbound type; answers `501 Not Implemented`.
#[derive(Debug)]
pub struct UnboundHandler {
    type_name: String,
}

impl UnboundHandler {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
        }
    }
}

impl RequestHandler for UnboundHandler {
    fn handle(&self, _request: Request) -> Response {
        let mut response = Response::new(format!("`{}` is not bound", self.type_name).into_bytes());
        *response.status_mut() = http::StatusCode::NOT_IMPLEMENTED;
        response
    }
}

/// Stand-in middleware of a declared but unbound type; passes requests through.
#[derive(Debug)]
pub struct UnboundMiddleware;

impl Middleware for UnboundMiddleware {
    fn process(&self, request: Request, next: &dyn RequestHandler) -> Response {
        next.handle(request)
    }
}
