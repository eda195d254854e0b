//! Route metadata extraction.
//!
//! A type becomes a route source by carrying a `#[route(...)]` attribute and implementing
//! [`RequestHandler`](crate::route::RequestHandler):
//!
//! ```text
//! #[route(
//!     name = "users.show",
//!     path = "/users/{id<\\d+>}",
//!     methods = ["GET", "HEAD"],
//!     priority = 10,
//!     middlewares = [Authenticate],
//!     attributes = { section = "users" },
//! )]
//! pub struct ShowUser;
//! ```

use crate::document::{Mapping, Node};
use crate::error::{Error, Result};
use crate::metadata;
use crate::path_template;
use crate::route::{MIDDLEWARE, REQUEST_HANDLER};
use crate::universe::{CandidateType, TypeUniverse};
use log::debug;

/// Name of the route attribute
pub const ROUTE_ATTRIBUTE: &str = "route";

/// Validated content of a `#[route]` attribute
#[derive(Debug, Clone, PartialEq)]
pub struct RouteAnnotation {
    pub name: String,
    pub path: String,
    /// Distinct methods in declaration order
    pub methods: Vec<String>,
    pub priority: i64,
    /// Type names of the middlewares, in execution order
    pub middleware_refs: Vec<String>,
    pub attributes: Mapping,
    /// Declaring type, set once validation succeeded
    pub source: Option<String>,
}

/// Reads route annotations from candidate types
pub struct AnnotationExtractor<'u> {
    universe: &'u TypeUniverse,
}

impl<'u> AnnotationExtractor<'u> {
    pub fn new(universe: &'u TypeUniverse) -> Self {
        Self { universe }
    }

    /// Extracts the route annotations of `types`, highest priority first.
    ///
    /// Types without `#[route]` are skipped. Annotations of equal priority keep the order of
    /// `types`.
    ///
    /// # Errors
    ///
    /// [`Error::AnnotationValidation`] for malformed metadata,
    /// [`Error::CapabilityMismatch`] when the type does not implement `RequestHandler` or a
    /// middleware does not implement `Middleware`, and [`Error::TypeCollision`] when either
    /// name is declared more than once.
    pub fn extract(&self, types: &[CandidateType]) -> Result<Vec<RouteAnnotation>> {
        let mut annotations = Vec::new();

        for candidate in types {
            let Some(attr) = candidate.unique_attribute(ROUTE_ATTRIBUTE)? else {
                continue;
            };

            let entries = metadata::parse_entries(attr)
                .map_err(|e| Error::validation(&candidate.name, e.to_string()))?;
            let mut annotation = RouteAnnotation::from_entries(&candidate.name, entries)?;

            self.require(&candidate.name, REQUEST_HANDLER)?;
            for middleware in &annotation.middleware_refs {
                self.require(middleware, MIDDLEWARE)?;
            }

            debug!(
                "Found route `{}` {:?} {} on {}",
                annotation.name, annotation.methods, annotation.path, candidate.name
            );
            annotation.source = Some(candidate.name.clone());
            annotations.push(annotation);
        }

        annotations.sort_by(|a, b| b.priority.cmp(&a.priority));
        Ok(annotations)
    }

    /// Fails unless `type_name` names a single type implementing `capability`.
    fn require(&self, type_name: &str, capability: &'static str) -> Result<()> {
        self.universe.get(type_name)?;
        if !self.universe.implements(type_name, capability) {
            return Err(Error::CapabilityMismatch {
                type_name: type_name.to_string(),
                capability,
            });
        }
        Ok(())
    }
}

impl RouteAnnotation {
    /// Validates the entries of a `#[route]` attribute declared on `type_name`.
    pub fn from_entries(type_name: &str, entries: Mapping) -> Result<Self> {
        let fail = |message: String| Error::validation(type_name, message);

        let mut name = None;
        let mut path = None;
        let mut methods = None;
        let mut priority = 0;
        let mut middleware_refs = Vec::new();
        let mut attributes = Mapping::new();

        for (key, value) in entries {
            match key.as_str() {
                "name" => name = Some(expect_string(&key, value).map_err(fail)?),
                "path" => path = Some(expect_string(&key, value).map_err(fail)?),
                "methods" => methods = Some(expect_strings(&key, value).map_err(fail)?),
                "priority" => match value {
                    Node::Integer(value) => priority = value,
                    other => return Err(fail(format!("`priority` must be an integer, found {}", kind(&other)))),
                },
                "middlewares" => middleware_refs = expect_strings(&key, value).map_err(fail)?,
                "attributes" => match value {
                    Node::Mapping(map) => attributes = map,
                    other => return Err(fail(format!("`attributes` must be a mapping, found {}", kind(&other)))),
                },
                other => return Err(fail(format!("unknown field `{}`", other))),
            }
        }

        let name = name.ok_or_else(|| fail("missing required field `name`".to_string()))?;
        let path = path.ok_or_else(|| fail("missing required field `path`".to_string()))?;
        let methods = methods.ok_or_else(|| fail("missing required field `methods`".to_string()))?;

        if methods.is_empty() {
            return Err(fail("`methods` must not be empty".to_string()));
        }
        let mut distinct: Vec<String> = Vec::with_capacity(methods.len());
        for method in methods {
            if method.is_empty() {
                return Err(fail("`methods` must not contain an empty string".to_string()));
            }
            if !distinct.contains(&method) {
                distinct.push(method);
            }
        }

        path_template::parse(&path).map_err(|e| fail(e.to_string()))?;

        Ok(RouteAnnotation {
            name,
            path,
            methods: distinct,
            priority,
            middleware_refs,
            attributes,
            source: None,
        })
    }
}

fn expect_string(key: &str, value: Node) -> std::result::Result<String, String> {
    match value {
        Node::String(value) => Ok(value),
        other => Err(format!("`{}` must be a string, found {}", key, kind(&other))),
    }
}

fn expect_strings(key: &str, value: Node) -> std::result::Result<Vec<String>, String> {
    let Node::Sequence(items) = value else {
        return Err(format!("`{}` must be a list, found {}", key, kind(&value)));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Node::String(value) => Ok(value),
            other => Err(format!(
                "`{}` must contain only strings, element {} is {}",
                key,
                index,
                kind(&other)
            )),
        })
        .collect()
}

fn kind(node: &Node) -> &'static str {
    match node {
        Node::Null => "null",
        Node::Bool(_) => "a boolean",
        Node::Integer(_) => "an integer",
        Node::Float(_) => "a float",
        Node::String(_) => "a string",
        Node::Sequence(_) => "a list",
        Node::Mapping(_) => "a mapping",
        Node::Reference(_) => "a reference",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(code: &str) -> (TypeUniverse, Vec<CandidateType>) {
        let mut universe = TypeUniverse::new();
        let types = universe.load_source("handlers.rs", code).unwrap();
        (universe, types)
    }

    fn extract(code: &str) -> Result<Vec<RouteAnnotation>> {
        let (universe, types) = load(code);
        AnnotationExtractor::new(&universe).extract(&types)
    }

    fn validation_message(code: &str) -> String {
        match extract(code).unwrap_err() {
            Error::AnnotationValidation { type_name, message } => {
                assert_eq!(type_name, "Invalid");
                message
            }
            other => panic!("expected a validation error, got {other}"),
        }
    }

    #[test]
    fn test_full_annotation() {
        let annotations = extract(
            r#"
            #[route(
                name = "users.show",
                path = "/users/{id}",
                methods = ["GET", "HEAD", "GET"],
                priority = -2,
                middlewares = [auth::Authenticate, "RateLimit"],
                attributes = { section = "users", weight = 3 },
            )]
            pub struct ShowUser;
            impl RequestHandler for ShowUser {}
            impl Middleware for Authenticate {}
            impl Middleware for RateLimit {}
            "#,
        )
        .unwrap();

        assert_eq!(annotations.len(), 1);
        let annotation = &annotations[0];
        assert_eq!(annotation.name, "users.show");
        assert_eq!(annotation.path, "/users/{id}");
        assert_eq!(annotation.methods, vec!["GET", "HEAD"]);
        assert_eq!(annotation.priority, -2);
        assert_eq!(annotation.middleware_refs, vec!["Authenticate", "RateLimit"]);
        assert_eq!(annotation.attributes["weight"], Node::Integer(3));
        assert_eq!(annotation.source.as_deref(), Some("ShowUser"));
    }

    #[test]
    fn test_types_without_route_are_skipped() {
        let annotations = extract(
            r#"
            #[route(name = "home", path = "/", methods = ["GET"])]
            pub struct Home;
            impl RequestHandler for Home {}

            pub struct Helper;
            #[derive(Debug)]
            pub enum Status { Active }
            "#,
        )
        .unwrap();

        assert_eq!(annotations.len(), 1);
    }

    #[test]
    fn test_sorted_by_descending_priority_with_stable_ties() {
        let annotations = extract(
            r#"
            #[route(name = "a", path = "/a", methods = ["GET"])]
            pub struct A;
            #[route(name = "b", path = "/b", methods = ["GET"], priority = 5)]
            pub struct B;
            #[route(name = "c", path = "/c", methods = ["GET"])]
            pub struct C;
            #[route(name = "d", path = "/d", methods = ["GET"], priority = 1)]
            pub struct D;
            impl RequestHandler for A {}
            impl RequestHandler for B {}
            impl RequestHandler for C {}
            impl RequestHandler for D {}
            "#,
        )
        .unwrap();

        let names: Vec<_> = annotations.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_missing_required_fields() {
        let message = validation_message(
            r#"
            #[route(name = "home", path = "/")]
            pub struct Invalid;
            impl RequestHandler for Invalid {}
            "#,
        );
        assert!(message.contains("`methods`"));

        let message = validation_message(
            r#"
            #[route(path = "/", methods = ["GET"])]
            pub struct Invalid;
            impl RequestHandler for Invalid {}
            "#,
        );
        assert!(message.contains("`name`"));

        let message = validation_message(
            r#"
            #[route]
            pub struct Invalid;
            impl RequestHandler for Invalid {}
            "#,
        );
        assert!(message.contains("missing"));
    }

    #[test]
    fn test_nested_methods_are_rejected() {
        let message = validation_message(
            r#"
            #[route(name = "home", path = "/", methods = ["HEAD", ["GET"], "POST"])]
            pub struct Invalid;
            impl RequestHandler for Invalid {}
            "#,
        );
        assert!(message.contains("element 1 is a list"));
    }

    #[test]
    fn test_malformed_fields_are_rejected() {
        let cases = [
            r#"#[route(name = "x", path = "/", methods = [])]"#,
            r#"#[route(name = "x", path = "/", methods = "GET")]"#,
            r#"#[route(name = "x", path = "/", methods = [""])]"#,
            r#"#[route(name = 1, path = "/", methods = ["GET"])]"#,
            r#"#[route(name = "x", path = "/{", methods = ["GET"])]"#,
            r#"#[route(name = "x", path = "/", methods = ["GET"], priority = "high")]"#,
            r#"#[route(name = "x", path = "/", methods = ["GET"], attributes = [])]"#,
            r#"#[route(name = "x", path = "/", methods = ["GET"], host = "a")]"#,
            r#"#[route(name = "x", path = "/", methods = ["GET"], name = "y")]"#,
        ];
        for attr in cases {
            let code = format!("{attr}\npub struct Invalid;\nimpl RequestHandler for Invalid {{}}");
            assert!(
                matches!(extract(&code), Err(Error::AnnotationValidation { .. })),
                "expected a validation error for {attr}"
            );
        }
    }

    #[test]
    fn test_route_source_must_be_a_request_handler() {
        let err = extract(
            r#"
            #[route(name = "home", path = "/", methods = ["GET"])]
            pub struct NotAHandler;
            impl Middleware for NotAHandler {}
            "#,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            Error::CapabilityMismatch { ref type_name, capability: REQUEST_HANDLER } if type_name == "NotAHandler"
        ));
    }

    #[test]
    fn test_two_route_attributes_are_rejected() {
        let message = validation_message(
            r#"
            #[route(name = "a", path = "/a", methods = ["GET"])]
            #[route(name = "b", path = "/b", methods = ["GET"])]
            pub struct Invalid;
            impl RequestHandler for Invalid {}
            "#,
        );
        assert!(message.contains("more than once"));
    }

    #[test]
    fn test_middlewares_must_implement_middleware() {
        let cases = [("DoesNotExist", ""), ("Home", "pub struct Home;\nimpl RequestHandler for Home {}")];
        for (middleware, extra) in cases {
            let code = format!(
                "#[route(name = \"x\", path = \"/\", methods = [\"GET\"], middlewares = [{middleware}])]\n\
                 pub struct Show;\nimpl RequestHandler for Show {{}}\n{extra}"
            );

            let err = extract(&code).unwrap_err();

            assert!(
                matches!(err, Error::CapabilityMismatch { ref type_name, capability: MIDDLEWARE } if type_name == middleware),
                "expected a capability mismatch for {middleware}, got {err}"
            );
        }
    }

    #[test]
    fn test_route_source_with_a_repeated_name_is_rejected() {
        let mut universe = TypeUniverse::new();
        universe.load_source("admin.rs", "pub struct Home;").unwrap();
        let types = universe
            .load_source(
                "home.rs",
                r#"
                #[route(name = "home", path = "/", methods = ["GET"])]
                pub struct Home;
                impl RequestHandler for Home {}
                "#,
            )
            .unwrap();

        let err = AnnotationExtractor::new(&universe).extract(&types).unwrap_err();

        assert!(matches!(err, Error::TypeCollision { ref name, .. } if name == "Home"));
    }
}
