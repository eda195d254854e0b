use crate::instance::Constructors;
use crate::loader::RouteLoader;
use crate::openapi_builder::{Info, MergePolicy, OpenApi, Server};
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::path::PathBuf;

/// Generate an OpenAPI document from the route annotations of a Rust source tree
#[derive(Parser, Debug)]
#[command(name = "openapi-from-annotations")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Directory holding the annotated handler sources
    #[arg(value_name = "SOURCE_DIR")]
    pub source_dir: PathBuf,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// API title written into `info.title`
    #[arg(long = "title", default_value = "Generated API")]
    pub title: String,

    /// API version written into `info.version`
    #[arg(long = "api-version", default_value = "1.0.0")]
    pub api_version: String,

    /// API description written into `info.description`
    #[arg(long = "description")]
    pub description: Option<String>,

    /// Server URL, may be repeated
    #[arg(long = "server", value_name = "URL")]
    pub servers: Vec<String>,

    /// Let a later route replace an earlier one with the same path and method
    #[arg(long = "allow-overwrite")]
    pub allow_overwrite: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.source_dir.exists() {
        anyhow::bail!("Source directory does not exist: {}", args.source_dir.display());
    }

    if !args.source_dir.is_dir() {
        anyhow::bail!("Source path is not a directory: {}", args.source_dir.display());
    }

    if args.title.trim().is_empty() {
        anyhow::bail!("API title must not be empty");
    }

    info!("Source directory: {}", args.source_dir.display());
    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting OpenAPI document generation...");

    // Step 1: Load routes. Handlers are not instantiated outside the application.
    info!("Loading routes...");
    let mut loader = RouteLoader::new(Constructors::unbound());
    let routes = loader
        .load(&args.source_dir)
        .with_context(|| format!("Failed to load routes from {}", args.source_dir.display()))?;

    info!("Loaded {} routes", routes.len());
    if routes.is_empty() {
        warn!("No routes found in {}", args.source_dir.display());
    }

    // Step 2: Build the document
    info!("Building OpenAPI document...");
    let mut info = Info::new(args.title.clone(), args.api_version.clone());
    info.description = args.description.clone();

    let policy = if args.allow_overwrite {
        MergePolicy::Overwrite
    } else {
        MergePolicy::Reject
    };
    let mut openapi = OpenApi::new(info)?.with_merge_policy(policy);
    for url in &args.servers {
        openapi.push_server(Server::new(url.clone()))?;
    }
    openapi.add_routes(&routes);
    openapi
        .generate_documentation(loader.universe())
        .context("Failed to generate the OpenAPI document")?;
    info!("OpenAPI document built successfully");

    // Step 3: Serialize to requested format
    info!("Serializing to {:?} format...", args.output_format);
    let content = match args.output_format {
        OutputFormat::Yaml => serialize_yaml(openapi.document())?,
        OutputFormat::Json => serialize_json(openapi.document())?,
    };

    // Step 4: Output to file or stdout
    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)?;
        info!("Successfully wrote OpenAPI document to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    let components = openapi
        .document()
        .get("components")
        .and_then(|c| c.as_mapping())
        .map(|c| c.values().filter_map(|entries| entries.as_mapping()).map(|e| e.len()).sum::<usize>())
        .unwrap_or(0);

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Types loaded: {}", loader.universe().len());
    info!("  - Routes found: {}", routes.len());
    info!("  - Components: {}", components);

    Ok(())
}
