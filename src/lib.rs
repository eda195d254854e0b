//! OpenAPI from annotations - route discovery and OpenAPI documentation for annotated handlers.
//!
//! Request handlers are plain Rust types carrying attributes: `#[route(...)]` declares the
//! route, `#[operation(...)]` the documentation of its operations and
//! `#[component(category, ...)]` shared definitions that operations refer to with
//! `reference(category, Type)`. The sources declaring them are loaded into an explicit
//! [`TypeUniverse`](universe::TypeUniverse) and introspected from there.
//!
//! # Architecture
//!
//! 1. [`scanner`] - Discovers source artifacts and registers them into the [`universe`]
//! 2. [`parser`] - Parses Rust source files into syntax trees
//! 3. [`extractor`] - Reads and validates `#[route]` annotations
//! 4. [`assembler`] - Resolves handler and middleware types to [`instance`]s and builds [`route`]s
//! 5. [`loader`] - Composes the steps above behind a single `load`
//! 6. [`operation`] - Synthesizes the operation of a route, including its [`path_template`] parameters
//! 7. [`openapi_builder`] - Assembles the [`document`] tree
//! 8. [`references`] - Replaces reference placeholders with pointers and fills `components`
//! 9. [`serializer`] - Serializes the document to YAML or JSON
//!
//! # Example Usage
//!
//! ```no_run
//! use openapi_from_annotations::instance::Constructors;
//! use openapi_from_annotations::loader::RouteLoader;
//! use openapi_from_annotations::openapi_builder::{Info, OpenApi};
//! use openapi_from_annotations::serializer::serialize_yaml;
//!
//! // Discover routes; handlers are only declared, not instantiated
//! let mut loader = RouteLoader::new(Constructors::unbound());
//! let routes = loader.load("./src/handlers").unwrap();
//!
//! // Build the OpenAPI document
//! let mut openapi = OpenApi::new(Info::new("My API", "1.0.0")).unwrap();
//! openapi.add_routes(&routes);
//! openapi.generate_documentation(loader.universe()).unwrap();
//!
//! // Serialize to YAML
//! let yaml = serialize_yaml(openapi.document()).unwrap();
//! println!("{}", yaml);
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete CLI application.

pub mod assembler;
pub mod cli;
pub mod document;
pub mod error;
pub mod extractor;
pub mod instance;
pub mod loader;
pub mod metadata;
pub mod openapi_builder;
pub mod operation;
pub mod parser;
pub mod path_template;
pub mod references;
pub mod route;
pub mod scanner;
pub mod serializer;
pub mod universe;
