use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for route discovery and document generation
#[derive(Debug, Error)]
pub enum Error {
    /// The root location or one of its entries could not be read
    #[error("filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A source artifact could not be loaded into the type universe
    #[error("failed to load {}: {message}", path.display())]
    Load { path: PathBuf, message: String },

    /// A type name that is declared more than once was looked up
    #[error("type `{name}` declared in {} collides with the declaration in {}", second.display(), first.display())]
    TypeCollision {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// Route, operation or component metadata is malformed or incomplete
    #[error("invalid metadata on `{type_name}`: {message}")]
    AnnotationValidation { type_name: String, message: String },

    /// A type does not satisfy the capability it is used for
    #[error("`{type_name}` does not implement {capability}")]
    CapabilityMismatch {
        type_name: String,
        capability: &'static str,
    },

    /// A type could not be instantiated
    #[error("cannot instantiate `{type_name}`: {reason}")]
    Instantiation { type_name: String, reason: String },

    /// A route path is not a valid path template
    #[error("invalid path template `{path}`: {message}")]
    PathTemplate { path: String, message: String },

    /// Two routes describe the same path and method
    #[error("routes `{first}` and `{second}` both describe {method} {path}")]
    DuplicateOperation {
        path: String,
        method: String,
        first: String,
        second: String,
    },

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    pub(crate) fn validation(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::AnnotationValidation {
            type_name: type_name.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(format!("JSON: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Serialization(format!("YAML: {}", err))
    }
}
