use crate::error::Result;
use crate::extractor::RouteAnnotation;
use crate::instance::{Constructors, Instance, InstanceResolver};
use crate::route::{Route, RouteCollection};
use log::debug;

/// Turns validated annotations into routes holding live handler and middleware instances.
///
/// Instances come from the injection resolver when it can supply the type, and are
/// default-constructed otherwise.
pub struct RouteAssembler<'a> {
    constructors: &'a Constructors,
    resolver: Option<&'a dyn InstanceResolver>,
}

impl<'a> RouteAssembler<'a> {
    pub fn new(constructors: &'a Constructors) -> Self {
        Self {
            constructors,
            resolver: None,
        }
    }

    pub fn with_resolver(mut self, resolver: &'a dyn InstanceResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Builds one route per annotation, preserving their order.
    ///
    /// # Errors
    ///
    /// [`Error::Instantiation`](crate::error::Error::Instantiation) when an instance can be
    /// obtained neither way, [`Error::CapabilityMismatch`](crate::error::Error::CapabilityMismatch)
    /// when the instance is of the wrong kind.
    pub fn assemble(&self, annotations: Vec<RouteAnnotation>) -> Result<RouteCollection> {
        let mut routes = Vec::with_capacity(annotations.len());

        for annotation in annotations {
            let handler_type = annotation.source.unwrap_or_default();
            let request_handler = self.instance(&handler_type)?.into_handler(&handler_type)?;

            let middlewares = annotation
                .middleware_refs
                .iter()
                .map(|type_name| self.instance(type_name)?.into_middleware(type_name))
                .collect::<Result<Vec<_>>>()?;

            debug!(
                "Assembled route `{}` with {} middlewares",
                annotation.name,
                middlewares.len()
            );
            routes.push(Route::new(
                annotation.name,
                annotation.path,
                annotation.methods,
                handler_type,
                request_handler,
                middlewares,
                annotation.attributes,
            ));
        }

        Ok(RouteCollection::new(routes))
    }

    fn instance(&self, type_name: &str) -> Result<Instance> {
        match self.resolver {
            Some(resolver) if resolver.has(type_name) => {
                debug!("Resolving {} from the injection container", type_name);
                resolver.get(type_name)
            }
            _ => self.constructors.get(type_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Mapping;
    use crate::error::Error;
    use crate::instance::Container;
    use crate::route::{Middleware, Request, RequestHandler, Response};
    use std::sync::Arc;

    #[derive(Default)]
    struct Home;

    impl RequestHandler for Home {
        fn handle(&self, _request: Request) -> Response {
            Response::new(b"home".to_vec())
        }
    }

    #[derive(Default)]
    struct Tag;

    impl Middleware for Tag {
        fn process(&self, request: Request, next: &dyn RequestHandler) -> Response {
            let mut response = next.handle(request);
            response.body_mut().extend_from_slice(b"+tag");
            response
        }
    }

    fn annotation(name: &str, source: &str, middlewares: &[&str]) -> RouteAnnotation {
        RouteAnnotation {
            name: name.to_string(),
            path: format!("/{name}"),
            methods: vec!["GET".to_string()],
            priority: 0,
            middleware_refs: middlewares.iter().map(|m| m.to_string()).collect(),
            attributes: Mapping::new(),
            source: Some(source.to_string()),
        }
    }

    #[test]
    fn test_default_constructed_routes() {
        let constructors = Constructors::new().handler::<Home>().middleware::<Tag>();

        let routes = RouteAssembler::new(&constructors)
            .assemble(vec![annotation("home", "Home", &["Tag"]), annotation("other", "Home", &[])])
            .unwrap();

        assert_eq!(routes.names(), vec!["home", "other"]);
        let home = routes.get("home").unwrap();
        assert_eq!(home.handler_type(), "Home");
        assert_eq!(home.middlewares().len(), 1);

        let response = home.middlewares()[0].process(Request::new(Vec::new()), home.request_handler().as_ref());
        assert_eq!(response.into_body(), b"home+tag");
    }

    #[test]
    fn test_container_instances_are_shared() {
        let constructors = Constructors::new();
        let container = Container::new().with_handler(Home).with_middleware(Tag);

        let routes = RouteAssembler::new(&constructors)
            .with_resolver(&container)
            .assemble(vec![annotation("a", "Home", &["Tag"]), annotation("b", "Home", &["Tag"])])
            .unwrap();

        let a = routes.get("a").unwrap();
        let b = routes.get("b").unwrap();
        assert!(Arc::ptr_eq(a.request_handler(), b.request_handler()));
        assert!(Arc::ptr_eq(&a.middlewares()[0], &b.middlewares()[0]));
    }

    #[test]
    fn test_container_falls_back_to_constructors() {
        let constructors = Constructors::new().middleware::<Tag>();
        let container = Container::new().with_handler(Home);

        let routes = RouteAssembler::new(&constructors)
            .with_resolver(&container)
            .assemble(vec![annotation("a", "Home", &["Tag"])])
            .unwrap();

        assert_eq!(routes.len(), 1);
    }

    #[test]
    fn test_missing_constructor() {
        let constructors = Constructors::new().handler::<Home>();

        let err = RouteAssembler::new(&constructors)
            .assemble(vec![annotation("a", "Home", &["Unknown"])])
            .unwrap_err();

        assert!(matches!(err, Error::Instantiation { ref type_name, .. } if type_name == "Unknown"));
    }

    #[test]
    fn test_handler_used_as_middleware() {
        let constructors = Constructors::new().handler::<Home>();

        let err = RouteAssembler::new(&constructors)
            .assemble(vec![annotation("a", "Home", &["Home"])])
            .unwrap_err();

        assert!(matches!(err, Error::CapabilityMismatch { .. }));
    }
}
