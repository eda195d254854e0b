use crate::error::{Error, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use syn::visit::{self, Visit};
use syn::{Attribute, ItemEnum, ItemFn, ItemImpl, ItemStruct, Type};

/// AST parser for source artifacts.
///
/// The `AstParser` uses `syn` to turn a Rust source file into a syntax tree from which the
/// declared types, their attributes and their trait implementations are read.
///
/// # Example
///
/// ```no_run
/// use openapi_from_annotations::parser::AstParser;
/// use std::path::Path;
///
/// let parsed = AstParser::parse_file(Path::new("src/handlers.rs")).unwrap();
/// println!("Declared {} types", parsed.declarations().types.len());
/// ```
pub struct AstParser;

/// A successfully parsed source file.
#[derive(Debug)]
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// The parsed abstract syntax tree
    pub syntax_tree: syn::File,
}

/// Types and trait implementations declared in one file.
#[derive(Debug, Default)]
pub struct Declarations {
    /// `(type name, outer attributes)` in declaration order
    pub types: Vec<(String, Vec<Attribute>)>,
    /// `(type name, trait name)` for every `impl Trait for Type`
    pub impls: Vec<(String, String)>,
}

impl AstParser {
    /// Reads and parses a single source file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Filesystem`] if the file cannot be read and [`Error::Load`] if it
    /// is not valid Rust.
    pub fn parse_file(path: &Path) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());

        let content = fs::read_to_string(path).map_err(|source| Error::Filesystem {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse_source(path, &content)
    }

    /// Parses source code that is attributed to `path`.
    pub fn parse_source(path: &Path, content: &str) -> Result<ParsedFile> {
        let syntax_tree = syn::parse_file(content).map_err(|e| Error::Load {
            path: path.to_path_buf(),
            message: format!("invalid Rust syntax: {}", e),
        })?;

        debug!("Successfully parsed file: {}", path.display());

        Ok(ParsedFile {
            path: path.to_path_buf(),
            syntax_tree,
        })
    }

    /// Parses every file, failing on the first one that cannot be loaded.
    pub fn parse_files(paths: &[PathBuf]) -> Result<Vec<ParsedFile>> {
        debug!("Parsing {} files", paths.len());

        let parsed = paths
            .iter()
            .map(|path| {
                Self::parse_file(path).inspect_err(|e| warn!("Failed to parse {}: {}", path.display(), e))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("Parsing complete: {} files", parsed.len());
        Ok(parsed)
    }
}

impl ParsedFile {
    /// Lists the types and trait implementations declared in this file, including those
    /// inside inline modules. Items local to function bodies are not visible.
    pub fn declarations(&self) -> Declarations {
        let mut visitor = DeclarationVisitor::default();
        visitor.visit_file(&self.syntax_tree);
        visitor.declarations
    }
}

#[derive(Default)]
struct DeclarationVisitor {
    declarations: Declarations,
}

impl<'ast> Visit<'ast> for DeclarationVisitor {
    fn visit_item_struct(&mut self, item: &'ast ItemStruct) {
        self.declarations
            .types
            .push((item.ident.to_string(), item.attrs.clone()));
    }

    fn visit_item_enum(&mut self, item: &'ast ItemEnum) {
        self.declarations
            .types
            .push((item.ident.to_string(), item.attrs.clone()));
    }

    fn visit_item_impl(&mut self, item: &'ast ItemImpl) {
        let trait_name = item
            .trait_
            .as_ref()
            .and_then(|(_, path, _)| path.segments.last())
            .map(|segment| segment.ident.to_string());
        let type_name = match &*item.self_ty {
            Type::Path(type_path) => type_path.path.segments.last().map(|s| s.ident.to_string()),
            _ => None,
        };

        if let (Some(type_name), Some(trait_name)) = (type_name, trait_name) {
            self.declarations.impls.push((type_name, trait_name));
        }
        visit::visit_item_impl(self, item);
    }

    fn visit_item_fn(&mut self, _item: &'ast ItemFn) {}

    fn visit_impl_item_fn(&mut self, _item: &'ast syn::ImplItemFn) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    /// Helper function to create a temporary file with content
    fn create_temp_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let file_path = dir.path().join(name);
        let mut file = fs::File::create(&file_path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file_path
    }

    #[test]
    fn test_parse_valid_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = create_temp_file(&temp_dir, "valid.rs", "pub struct Home;");

        let parsed = AstParser::parse_file(&file_path).unwrap();

        assert_eq!(parsed.path, file_path);
        assert_eq!(parsed.syntax_tree.items.len(), 1);
    }

    #[test]
    fn test_parse_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = create_temp_file(&temp_dir, "invalid.rs", "pub struct Broken {");

        let err = AstParser::parse_file(&file_path).unwrap_err();

        assert!(matches!(err, Error::Load { .. }));
        assert!(err.to_string().contains("invalid.rs"));
    }

    #[test]
    fn test_parse_nonexistent_file() {
        let err = AstParser::parse_file(Path::new("/nonexistent/file.rs")).unwrap_err();
        assert!(matches!(err, Error::Filesystem { .. }));
    }

    #[test]
    fn test_parse_files_fails_as_a_whole() {
        let temp_dir = TempDir::new().unwrap();
        let good = create_temp_file(&temp_dir, "good.rs", "pub struct Good;");
        let bad = create_temp_file(&temp_dir, "bad.rs", "pub fn broken( {");

        assert_eq!(AstParser::parse_files(&[good.clone()]).unwrap().len(), 1);
        assert!(AstParser::parse_files(&[good, bad]).is_err());
        assert!(AstParser::parse_files(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_declarations() {
        let code = r#"
            #[route(name = "home", path = "/", methods = ["GET"])]
            pub struct Home;

            pub enum Status { Active }

            impl RequestHandler for Home {
                fn handle(&self, request: Request) -> Response {
                    struct Hidden;
                    todo!()
                }
            }

            impl Home {
                fn inherent(&self) {}
            }

            mod nested {
                pub struct Inner;
                impl crate::contracts::Middleware for Inner {}
            }

            fn local() {
                struct AlsoHidden;
            }
        "#;
        let parsed = AstParser::parse_source(Path::new("lib.rs"), code).unwrap();
        let declarations = parsed.declarations();

        let names: Vec<_> = declarations.types.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["Home", "Status", "Inner"]);
        assert_eq!(declarations.types[0].1.len(), 1);
        assert_eq!(
            declarations.impls,
            vec![
                ("Home".to_string(), "RequestHandler".to_string()),
                ("Inner".to_string(), "Middleware".to_string()),
            ]
        );
    }
}
