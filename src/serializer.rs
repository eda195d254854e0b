//! Serialization module for writing documents as YAML or JSON.
//!
//! Only resolved documents can be serialized: a remaining reference placeholder is an error.

use crate::document::Node;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Serializes a document to YAML format.
///
/// # Errors
///
/// Returns an error if the document still contains reference placeholders.
///
/// # Example
///
/// ```
/// use openapi_from_annotations::openapi_builder::{Info, OpenApi};
/// use openapi_from_annotations::serializer::serialize_yaml;
///
/// let openapi = OpenApi::new(Info::new("Users", "1.0.0")).unwrap();
/// let yaml = serialize_yaml(openapi.document()).unwrap();
/// assert!(yaml.contains("3.0.2"));
/// ```
pub fn serialize_yaml(doc: &Node) -> Result<String> {
    debug!("Serializing OpenAPI document to YAML");
    serde_yaml::to_string(doc).context("Failed to serialize OpenAPI document to YAML")
}

/// Serializes a document to JSON format with pretty printing.
///
/// # Errors
///
/// Returns an error if the document still contains reference placeholders.
pub fn serialize_json(doc: &Node) -> Result<String> {
    debug!("Serializing OpenAPI document to JSON");
    serde_json::to_string_pretty(doc).context("Failed to serialize OpenAPI document to JSON")
}

/// Writes string content to a file, creating parent directories as needed.
///
/// Overwrites the file if it exists.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content).with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
