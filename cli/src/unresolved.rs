#![deny(missing_docs)]

//! # Unresolved Command
//!
//! Lists references that carry no content after resolution: never loaded,
//! skipped by policy, or missing from their document.

use apiref_core::Context;

use crate::error::CliResult;
use crate::source::SourceArgs;

/// Arguments for the unresolved command.
#[derive(clap::Args, Debug, Clone)]
pub struct UnresolvedArgs {
    #[clap(flatten)]
    pub source: SourceArgs,
}

/// One `<domain>\t<uri>` line per reference without content.
pub fn report(context: &Context) -> Vec<String> {
    context
        .references
        .iter()
        .flat_map(|(domain, container)| {
            container
                .iter()
                .filter(|(_, cache)| {
                    let base = cache.cached();
                    !base.resolved || (base.value.is_none() && base.raw.is_none())
                })
                .map(move |(uri, _)| format!("{}\t{}", domain, uri))
        })
        .collect()
}

/// Executes the unresolved command.
pub async fn execute(args: &UnresolvedArgs) -> CliResult<Vec<String>> {
    let context = args.source.resolve_context().await?;
    Ok(report(&context))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_reports_skipped_documents() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("api.json");
        fs::write(
            &file,
            r##"{ "definitions": { "Pet": { "$ref": "other.json#/Pet" }, "Tag": {} } }"##,
        )
        .unwrap();

        let args = UnresolvedArgs {
            source: SourceArgs {
                file,
                options: None,
                no_remote: true,
                no_resolve: false,
                timeout: None,
            },
        };

        let lines = execute(&args).await.unwrap();
        assert_eq!(lines, vec!["schemas\tother.json#/Pet".to_string()]);
    }
}
