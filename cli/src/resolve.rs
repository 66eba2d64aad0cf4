#![deny(missing_docs)]

//! # Resolve Command
//!
//! Resolves a document and prints every loaded definition expanded to the
//! requested depth, grouped by domain.

use std::fs;
use std::path::PathBuf;

use apiref_core::expand_context;
use serde_json::Value;

use crate::error::CliResult;
use crate::source::SourceArgs;

/// Output encoding.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// YAML.
    Yaml,
}

/// Arguments for the resolve command.
#[derive(clap::Args, Debug, Clone)]
pub struct ResolveArgs {
    #[clap(flatten)]
    pub source: SourceArgs,

    /// Expansion depth for circular references.
    #[clap(long, default_value_t = 2)]
    pub depth: usize,

    /// Output encoding.
    #[clap(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Write to this file instead of stdout.
    #[clap(long, short)]
    pub output: Option<PathBuf>,
}

/// Executes the resolve command and returns the rendered output.
pub async fn execute(args: &ResolveArgs) -> CliResult<String> {
    let context = args.source.resolve_context().await?;
    let expanded = Value::Object(expand_context(&context, args.depth));

    let rendered = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&expanded)?,
        OutputFormat::Yaml => serde_yaml::to_string(&expanded)?,
    };

    if let Some(output) = &args.output {
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(output, &rendered)?;
    }
    Ok(rendered)
}
