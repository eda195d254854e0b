use crate::assembler::RouteAssembler;
use crate::error::Result;
use crate::extractor::AnnotationExtractor;
use crate::instance::{Constructors, InstanceResolver};
use crate::route::RouteCollection;
use crate::scanner::{RouteDefinitionProvider, SourceScanner};
use crate::universe::TypeUniverse;
use log::info;
use std::path::Path;

/// Discovers routes declared by the types under a location.
///
/// The loader owns the [`TypeUniverse`] its artifacts are registered into, so repeated
/// loads only see the types they newly make available. Keep the loader around to hand its
/// universe to [`OpenApi::generate_documentation`](crate::openapi_builder::OpenApi::generate_documentation).
///
/// # Example
///
/// ```no_run
/// use openapi_from_annotations::instance::{Constructors, Container};
/// use openapi_from_annotations::loader::RouteLoader;
///
/// let mut loader = RouteLoader::new(Constructors::new());
/// loader.set_injection_resolver(Container::new());
/// let routes = loader.load("./src/handlers").unwrap();
/// println!("{} routes", routes.len());
/// ```
pub struct RouteLoader {
    universe: TypeUniverse,
    constructors: Constructors,
    resolver: Option<Box<dyn InstanceResolver>>,
}

impl RouteLoader {
    pub fn new(constructors: Constructors) -> Self {
        Self {
            universe: TypeUniverse::new(),
            constructors,
            resolver: None,
        }
    }

    /// Prefers instances from `resolver` over default construction for subsequent loads.
    pub fn set_injection_resolver(&mut self, resolver: impl InstanceResolver + 'static) {
        self.resolver = Some(Box::new(resolver));
    }

    /// Loads every source artifact under `location` and returns the routes it declares.
    pub fn load(&mut self, location: impl AsRef<Path>) -> Result<RouteCollection> {
        self.load_from(&SourceScanner::new(location.as_ref()))
    }

    /// Loads the artifacts of `provider` and returns the routes they declare.
    pub fn load_from(&mut self, provider: &dyn RouteDefinitionProvider) -> Result<RouteCollection> {
        let types = provider.provide(&mut self.universe)?;
        let annotations = AnnotationExtractor::new(&self.universe).extract(&types)?;

        let mut assembler = RouteAssembler::new(&self.constructors);
        if let Some(resolver) = &self.resolver {
            assembler = assembler.with_resolver(resolver.as_ref());
        }
        let routes = assembler.assemble(annotations)?;

        info!("Loaded {} routes from {} new types", routes.len(), types.len());
        Ok(routes)
    }

    pub fn universe(&self) -> &TypeUniverse {
        &self.universe
    }
}
