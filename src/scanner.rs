use crate::error::{Error, Result};
use crate::parser::{AstParser, ParsedFile};
use crate::universe::{CandidateType, TypeUniverse};
use log::{debug, info};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// An explicit source of route definitions.
///
/// A provider loads its artifacts into a [`TypeUniverse`] and returns the types that became
/// available, so discovery never relies on diffing a global registry.
pub trait RouteDefinitionProvider {
    /// Loads the provider's artifacts and returns the newly registered types.
    fn provide(&self, universe: &mut TypeUniverse) -> Result<Vec<CandidateType>>;
}

/// Scanner loading every Rust source file under a directory.
///
/// The `SourceScanner` recursively walks the directory in file-name order, skipping the
/// `target` directory and hidden directories (those starting with `.`), and registers each
/// `.rs` file it finds into the universe.
///
/// # Example
///
/// ```no_run
/// use openapi_from_annotations::scanner::SourceScanner;
/// use openapi_from_annotations::universe::TypeUniverse;
///
/// let mut universe = TypeUniverse::new();
/// let types = SourceScanner::new("./src/handlers").scan(&mut universe).unwrap();
/// println!("Loaded {} types", types.len());
/// ```
pub struct SourceScanner {
    root_path: PathBuf,
}

impl SourceScanner {
    /// Creates a new `SourceScanner` for the specified root directory.
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
        }
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Lists the `.rs` files under the root, as canonical paths in walk order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Filesystem`] if the root is missing, is not a directory, or any entry
    /// below it cannot be read.
    pub fn find_files(&self) -> Result<Vec<PathBuf>> {
        let root = &self.root_path;
        let metadata = fs::metadata(root).map_err(|source| Error::Filesystem {
            path: root.clone(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(Error::Filesystem {
                path: root.clone(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
            });
        }

        let mut rust_files = Vec::new();
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                // Don't filter the root directory itself
                if e.depth() == 0 {
                    return true;
                }

                let file_name = e.file_name().to_string_lossy();
                let is_hidden = file_name.starts_with('.');
                let is_target = e.file_type().is_dir() && file_name == "target";

                !is_hidden && !is_target
            });

        for entry in walker {
            let entry = entry.map_err(|e| Error::Filesystem {
                path: e.path().unwrap_or(root.as_path()).to_path_buf(),
                source: e.into(),
            })?;
            let path = entry.path();

            if entry.file_type().is_file() && path.extension().and_then(|s| s.to_str()) == Some("rs") {
                let canonical = fs::canonicalize(path).map_err(|source| Error::Filesystem {
                    path: path.to_path_buf(),
                    source,
                })?;
                rust_files.push(canonical);
            }
        }

        Ok(rust_files)
    }

    /// Loads every not yet loaded source file and returns the types they declare.
    ///
    /// Nothing is registered unless every file parses.
    pub fn scan(&self, universe: &mut TypeUniverse) -> Result<Vec<CandidateType>> {
        let mut files = self.find_files()?;
        let found = files.len();
        files.retain(|path| !universe.is_loaded(path));
        debug!(
            "Found {} source files under {} ({} already loaded)",
            found,
            self.root_path.display(),
            found - files.len()
        );

        let parsed = AstParser::parse_files(&files)?;
        let types = universe.register(parsed);
        info!(
            "Loaded {} types from {} files under {}",
            types.len(),
            files.len(),
            self.root_path.display()
        );
        Ok(types)
    }
}

impl RouteDefinitionProvider for SourceScanner {
    fn provide(&self, universe: &mut TypeUniverse) -> Result<Vec<CandidateType>> {
        self.scan(universe)
    }
}

/// A manifest of in-memory artifacts, e.g. sources embedded with `include_str!`.
#[derive(Debug, Default)]
pub struct InlineSources {
    sources: Vec<(PathBuf, String)>,
}

impl InlineSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an artifact named `path` with the given source code.
    pub fn with(mut self, path: impl Into<PathBuf>, code: impl Into<String>) -> Self {
        self.sources.push((path.into(), code.into()));
        self
    }
}

impl RouteDefinitionProvider for InlineSources {
    fn provide(&self, universe: &mut TypeUniverse) -> Result<Vec<CandidateType>> {
        let parsed = self
            .sources
            .iter()
            .filter(|(path, _)| !universe.is_loaded(path))
            .map(|(path, code)| AstParser::parse_source(path, code))
            .collect::<Result<Vec<ParsedFile>>>()?;
        Ok(universe.register(parsed))
    }
}
