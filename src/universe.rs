//! The type universe.
//!
//! Every type declared by a loaded source artifact is registered here, together with the
//! traits it implements. Later stages introspect the universe instead of the process: the
//! extractor reads `#[route]`, the synthesizer reads `#[operation]` and the reference
//! resolver reads `#[component]` from the registered declarations.

use crate::error::{Error, Result};
use crate::metadata;
use crate::parser::{AstParser, ParsedFile};
use indexmap::IndexMap;
use log::debug;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use syn::Attribute;

/// A type declared by a loaded artifact
#[derive(Debug)]
pub struct DeclaredType {
    pub name: String,
    /// Artifact the type was declared in
    pub file: PathBuf,
    /// Outer attributes written directly on the declaration
    pub attrs: Vec<Attribute>,
}

/// A type newly made available by a scan
pub type CandidateType = Rc<DeclaredType>;

impl DeclaredType {
    /// Attributes named `name` declared on this type.
    pub fn attributes<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Attribute> + 'a {
        self.attrs
            .iter()
            .filter(move |attr| metadata::is_attribute(attr, name))
    }

    /// The single attribute named `name`, if declared.
    ///
    /// # Errors
    ///
    /// Declaring the attribute more than once is a validation error.
    pub fn unique_attribute<'a>(&'a self, name: &'a str) -> Result<Option<&'a Attribute>> {
        let mut found = self.attributes(name);
        let first = found.next();
        if found.next().is_some() {
            return Err(Error::validation(
                &self.name,
                format!("`#[{}]` is declared more than once", name),
            ));
        }
        Ok(first)
    }
}

/// Registry of loaded artifacts and the types they declare
///
/// Types are known by their bare name. A name declared more than once is kept as ambiguous
/// and only becomes an error when something looks it up.
#[derive(Debug, Default)]
pub struct TypeUniverse {
    types: IndexMap<String, CandidateType>,
    /// Every artifact declaring a name that is declared more than once
    ambiguous: HashMap<String, Vec<PathBuf>>,
    impls: HashMap<String, BTreeSet<String>>,
    loaded: HashSet<PathBuf>,
}

impl TypeUniverse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the artifact at `path` has already been loaded.
    pub fn is_loaded(&self, path: &Path) -> bool {
        self.loaded.contains(path)
    }

    /// Parses `code` as the artifact `path` and registers it.
    pub fn load_source(&mut self, path: impl Into<PathBuf>, code: &str) -> Result<Vec<CandidateType>> {
        let path = path.into();
        if self.is_loaded(&path) {
            return Ok(Vec::new());
        }
        let parsed = AstParser::parse_source(&path, code)?;
        Ok(self.register(vec![parsed]))
    }

    /// Registers parsed artifacts and returns every type they declare.
    ///
    /// Artifacts that are already loaded are skipped.
    pub fn register(&mut self, files: Vec<ParsedFile>) -> Vec<CandidateType> {
        let mut added = Vec::new();

        for file in files {
            if self.is_loaded(&file.path) {
                debug!("Skipping already loaded artifact: {}", file.path.display());
                continue;
            }
            let declarations = file.declarations();
            debug!(
                "Registering {} types from {}",
                declarations.types.len(),
                file.path.display()
            );
            for (name, attrs) in declarations.types {
                let declared = Rc::new(DeclaredType {
                    name: name.clone(),
                    file: file.path.clone(),
                    attrs,
                });
                match self.types.get(&name) {
                    Some(first) => {
                        debug!("Type `{}` is declared more than once", name);
                        let first = first.file.clone();
                        self.ambiguous
                            .entry(name)
                            .or_insert_with(|| vec![first])
                            .push(file.path.clone());
                    }
                    None => {
                        self.types.insert(name, Rc::clone(&declared));
                    }
                }
                added.push(declared);
            }
            for (type_name, trait_name) in declarations.impls {
                self.impls.entry(type_name).or_default().insert(trait_name);
            }
            self.loaded.insert(file.path);
        }

        added
    }

    /// Looks up a declared type by name.
    ///
    /// # Errors
    ///
    /// [`Error::TypeCollision`] when more than one declaration carries `name`.
    pub fn get(&self, name: &str) -> Result<Option<&CandidateType>> {
        if let Some(files) = self.ambiguous.get(name) {
            return Err(Error::TypeCollision {
                name: name.to_string(),
                first: files[0].clone(),
                second: files[files.len() - 1].clone(),
            });
        }
        Ok(self.types.get(name))
    }

    /// Whether any loaded artifact contains `impl <capability> for <type_name>`.
    pub fn implements(&self, type_name: &str, capability: &str) -> bool {
        self.impls
            .get(type_name)
            .map(|traits| traits.contains(capability))
            .unwrap_or(false)
    }

    /// All declared types in registration order, the first declaration of each name.
    pub fn types(&self) -> impl Iterator<Item = &CandidateType> {
        self.types.values()
    }

    /// Number of distinct type names.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
