#![deny(missing_docs)]

//! # apiref CLI
//!
//! Command Line Interface for the reference resolution engine.
//!
//! Supported Commands:
//! - `resolve`: Prints every definition of a document expanded to a depth.
//! - `unresolved`: Lists references left without content.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::error::CliResult;

mod error;
mod resolve;
mod source;
mod unresolved;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Swagger / OpenAPI $ref resolver")]
struct Cli {
    /// Log resolution progress to stderr.
    #[clap(long, short, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a document and print its expanded definitions.
    Resolve(resolve::ResolveArgs),
    /// List references that could not be loaded.
    Unresolved(unresolved::UnresolvedArgs),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Resolve(args) => {
            let rendered = resolve::execute(args).await?;
            if args.output.is_none() {
                println!("{}", rendered);
            }
        }
        Commands::Unresolved(args) => {
            for line in unresolved::execute(args).await? {
                println!("{}", line);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli_structure() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_resolve_flags() {
        let cli = Cli::parse_from([
            "apiref",
            "resolve",
            "api.yaml",
            "--depth",
            "4",
            "--format",
            "yaml",
            "--no-remote",
        ]);
        match cli.command {
            Commands::Resolve(args) => {
                assert_eq!(args.depth, 4);
                assert_eq!(args.format, resolve::OutputFormat::Yaml);
                assert!(args.source.no_remote);
            }
            Commands::Unresolved(_) => panic!("expected resolve"),
        }
    }
}
