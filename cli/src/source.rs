#![deny(missing_docs)]

//! # Source Arguments
//!
//! Input document and resolution flags shared by every command.

use std::path::PathBuf;

use apiref_core::{
    discover_references, Context, ContextResolver, Item, ResolverOptions, VariableResolver,
};
use tracing::info;

use crate::error::CliResult;

/// Document and resolution policy.
#[derive(clap::Args, Debug, Clone)]
pub struct SourceArgs {
    /// Swagger / OpenAPI document (JSON or YAML).
    pub file: PathBuf,

    /// Resolver options file (YAML or JSON).
    #[clap(long, env = "APIREF_OPTIONS")]
    pub options: Option<PathBuf>,

    /// Do not fetch documents other than FILE.
    #[clap(long)]
    pub no_remote: bool,

    /// Skip reference resolution entirely.
    #[clap(long)]
    pub no_resolve: bool,

    /// Abort resolution after this many seconds.
    #[clap(long, env = "APIREF_TIMEOUT")]
    pub timeout: Option<u64>,
}

impl SourceArgs {
    /// Builds options from the options file, then applies command line flags.
    pub fn resolver_options(&self) -> CliResult<ResolverOptions> {
        let mut options = match &self.options {
            Some(path) => ResolverOptions::from_path(path)?,
            None => ResolverOptions::default(),
        };
        if self.no_remote {
            options = options.without_remote();
        }
        if self.no_resolve {
            options.resolve.remote = false;
            options.resolve.local = false;
        }
        if let Some(secs) = self.timeout {
            options = options.with_timeout(secs);
        }
        Ok(options)
    }

    /// Reads FILE, discovers its references and resolves them.
    pub async fn resolve_context(&self) -> CliResult<Context> {
        let options = self.resolver_options()?;
        let item = Item::from_file(&self.file).await?;
        let context = discover_references(&item)?;

        let context = ContextResolver::new()
            .resolve_all(&item, context, Some(&options), Some(&VariableResolver))
            .await?;
        info!(file = %self.file.display(), "references resolved");
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn args(file: PathBuf) -> SourceArgs {
        SourceArgs {
            file,
            options: None,
            no_remote: false,
            no_resolve: false,
            timeout: None,
        }
    }

    #[test]
    fn test_flags_override_options_file() {
        let dir = tempdir().unwrap();
        let options_path = dir.path().join("options.yaml");
        fs::write(&options_path, "resolve: { local: false }\ntimeout_secs: 3\n").unwrap();

        let mut source = args(dir.path().join("api.yaml"));
        source.options = Some(options_path);
        source.no_remote = true;
        source.timeout = Some(10);

        let options = source.resolver_options().unwrap();
        assert!(options.resolve.is_disabled());
        assert_eq!(options.timeout_secs, Some(10));
    }

    #[test]
    fn test_no_resolve() {
        let mut source = args(PathBuf::from("api.yaml"));
        source.no_resolve = true;
        assert!(source.resolver_options().unwrap().resolve.is_disabled());
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempdir().unwrap();
        let result = args(dir.path().join("missing.yaml")).resolve_context().await;
        assert!(result.is_err());
    }
}
