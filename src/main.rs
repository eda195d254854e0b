//! Command-line tool generating an OpenAPI document from annotated route handlers.
//!
//! # Usage
//!
//! ```bash
//! openapi-from-annotations [OPTIONS] <SOURCE_DIR>
//! ```
//!
//! # Examples
//!
//! Generate YAML documentation:
//! ```bash
//! openapi-from-annotations ./src/handlers -o openapi.yaml
//! ```
//!
//! Generate JSON documentation with a title and a server:
//! ```bash
//! openapi-from-annotations ./src/handlers -f json --title "Users" --server https://api.example.com
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_from_annotations::cli;

fn main() -> Result<()> {
    // Parse once to read the verbose flag before the logger exists
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("openapi-from-annotations starting...");

    let args = cli::parse_args_from_parsed(args)?;

    cli::run(args)?;

    info!("OpenAPI document generation completed successfully");

    Ok(())
}
