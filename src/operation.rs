//! Operation synthesis.
//!
//! The handler type of a route may carry an `#[operation(...)]` attribute whose entries are
//! merged verbatim into the route's operations. Parameters derived from the path template
//! are appended to whatever `parameters` the attribute declares.

use crate::document::{Mapping, Node};
use crate::error::{Error, Result};
use crate::metadata;
use crate::path_template::{self, PathToken};
use crate::route::Route;
use crate::universe::TypeUniverse;
use serde::Serialize;

/// Name of the operation attribute
pub const OPERATION_ATTRIBUTE: &str = "operation";

/// A path parameter as it appears in an operation's `parameters` list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathParameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: &'static str,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<ParameterSchema>,
}

/// Schema of a parameter constrained by a pattern
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSchema {
    #[serde(rename = "type")]
    pub schema_type: &'static str,
    pub pattern: String,
}

impl From<PathToken> for PathParameter {
    fn from(token: PathToken) -> Self {
        PathParameter {
            name: token.name,
            location: "path",
            required: !token.optional,
            schema: token.pattern.map(|pattern| ParameterSchema {
                schema_type: "string",
                pattern,
            }),
        }
    }
}

/// Builds the operation object of a route
pub struct OperationSynthesizer<'u> {
    universe: &'u TypeUniverse,
}

impl<'u> OperationSynthesizer<'u> {
    pub fn new(universe: &'u TypeUniverse) -> Self {
        Self { universe }
    }

    /// Synthesizes the operation object of `route`.
    ///
    /// A handler type unknown to the universe, or one without `#[operation]`, yields an
    /// operation holding only the path parameters.
    pub fn synthesize(&self, route: &Route) -> Result<Mapping> {
        let type_name = route.handler_type();
        let mut operation = self.declared(type_name)?;

        let parameters = path_template::parse(route.path())?
            .into_iter()
            .map(|token| Node::from_serializable(&PathParameter::from(token)))
            .collect::<Result<Vec<_>>>()?;

        if !parameters.is_empty() {
            match operation
                .entry("parameters".to_string())
                .or_insert_with(|| Node::Sequence(Vec::new()))
            {
                Node::Sequence(declared) => declared.extend(parameters),
                _ => {
                    return Err(Error::validation(
                        type_name,
                        "`parameters` of `#[operation]` must be a list",
                    ))
                }
            }
        }

        Ok(operation)
    }

    fn declared(&self, type_name: &str) -> Result<Mapping> {
        let Some(declared) = self.universe.get(type_name)? else {
            return Ok(Mapping::new());
        };
        match declared.unique_attribute(OPERATION_ATTRIBUTE)? {
            Some(attr) => {
                metadata::parse_entries(attr).map_err(|e| Error::validation(type_name, e.to_string()))
            }
            None => Ok(Mapping::new()),
        }
    }
}
