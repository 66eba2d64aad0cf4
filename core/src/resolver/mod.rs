#![deny(missing_docs)]

//! # Context Resolver
//!
//! Drives every reference of a [`Context`] to a loaded state.
//!
//! A container is processed as a worklist: each pass takes the URIs that are
//! not loaded yet, fetches the documents they live in (concurrently, each
//! location at most once per run), then folds the loaded references back in
//! enumeration order with `update` followed by `create(dependencies)`. Newly
//! discovered dependencies feed the next pass. A URI is only ever created
//! once, so cycles terminate.
//!
//! Folding happens on a container owned by the call. On error the caller
//! gets the error and nothing else.

pub mod context;
pub mod fetch;
pub mod item;
pub mod params;

pub use context::{Context, SCHEMAS_DOMAIN};
pub use fetch::{DefaultFetcher, Fetcher};
pub use item::Item;
pub use params::{ParameterResolver, VariableResolver};

use crate::error::{AppError, AppResult};
use crate::options::{BaseMode, ResolverOptions};
use crate::refs::pointer::is_remote;
use crate::refs::{Reference, ReferenceContainer, ReferenceKind};
use futures::future::try_join_all;
use indexmap::{IndexMap, IndexSet};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Documents fetched during one run, keyed by location.
type Documents = IndexMap<String, String>;

/// How one unresolved reference gets its content in a pass.
#[derive(Debug)]
enum Step {
    /// Already decided without any I/O.
    Ready(Reference),
    /// Content is the item's own document.
    Local,
    /// Content must be fetched from this location.
    Fetch(String),
}

/// Loads references of a context, fetching other documents as needed.
#[derive(Debug, Clone, Default)]
pub struct ContextResolver<F = DefaultFetcher> {
    fetcher: F,
}

impl ContextResolver<DefaultFetcher> {
    /// Creates a resolver backed by the filesystem and HTTP.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<F: Fetcher> ContextResolver<F> {
    /// Creates a resolver backed by a custom fetcher.
    pub fn with_fetcher(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Loads a single reference.
    ///
    /// References into the item's own document are parsed from its content;
    /// others are fetched relative to the item's location. Only I/O can fail:
    /// malformed content is recovered by [`Reference::resolve`].
    pub async fn resolve_reference(&self, item: &Item, reference: &Reference) -> AppResult<Reference> {
        match reference.data_uri() {
            None => Ok(reference.mark_resolved()),
            Some(data_uri) if item.is_local(data_uri) => Ok(reference.resolve(&item.content)),
            Some(data_uri) => {
                let raw = self.fetcher.fetch(&item.resolve_location(data_uri)).await?;
                Ok(reference.resolve(&raw).rebase(|uri| item.canonical_uri(uri)))
            }
        }
    }

    /// Loads every reference of `container` with default options.
    pub async fn resolve_container(
        &self,
        item: &Item,
        container: ReferenceContainer,
    ) -> AppResult<ReferenceContainer> {
        self.resolve_container_with(item, container, &ResolverOptions::default())
            .await
    }

    /// Loads every reference of `container`, honoring `options`.
    #[instrument(skip_all)]
    pub async fn resolve_container_with(
        &self,
        item: &Item,
        container: ReferenceContainer,
        options: &ResolverOptions,
    ) -> AppResult<ReferenceContainer> {
        let mut documents = Documents::new();
        self.drive(item, container, options, &mut documents).await
    }

    /// Loads every domain of `context`, then hands the result to `parameters`.
    ///
    /// `resolve: false` passes every container through untouched. When
    /// `timeout_secs` is set, the whole run is bounded by it.
    #[instrument(skip_all)]
    pub async fn resolve_all(
        &self,
        item: &Item,
        context: Context,
        options: Option<&ResolverOptions>,
        parameters: Option<&dyn ParameterResolver>,
    ) -> AppResult<Context> {
        let defaults = ResolverOptions::default();
        let options = options.unwrap_or(&defaults);
        let run = self.run(item, context, options, parameters);

        match options.timeout_secs {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), run)
                .await
                .map_err(|_| AppError::Timeout(secs))?,
            None => run.await,
        }
    }

    /// Same as [`Self::resolve_all`], abandoned as soon as `cancel` completes.
    pub async fn resolve_all_until<C>(
        &self,
        item: &Item,
        context: Context,
        options: Option<&ResolverOptions>,
        parameters: Option<&dyn ParameterResolver>,
        cancel: C,
    ) -> AppResult<Context>
    where
        C: Future<Output = ()>,
    {
        tokio::select! {
            result = self.resolve_all(item, context, options, parameters) => result,
            _ = cancel => {
                warn!("resolution cancelled");
                Err(AppError::Cancelled)
            }
        }
    }

    async fn run(
        &self,
        item: &Item,
        mut context: Context,
        options: &ResolverOptions,
        parameters: Option<&dyn ParameterResolver>,
    ) -> AppResult<Context> {
        if options.resolve.is_disabled() {
            info!("reference resolution disabled");
        } else {
            let mut documents = Documents::new();
            let mut resolved = IndexMap::new();
            for (domain, container) in std::mem::take(&mut context.references) {
                let container = self.drive(item, container, options, &mut documents).await?;
                info!(%domain, references = container.len(), "domain resolved");
                resolved.insert(domain, container);
            }
            context.references = resolved;
        }

        match parameters {
            Some(resolver) => resolver.resolve_all(context, options),
            None => Ok(context),
        }
    }

    async fn drive(
        &self,
        item: &Item,
        mut container: ReferenceContainer,
        options: &ResolverOptions,
        documents: &mut Documents,
    ) -> AppResult<ReferenceContainer> {
        if options.resolve.is_disabled() {
            return Ok(container);
        }

        let mut pass = 0usize;
        loop {
            let pending = container.unresolved_references();
            if pending.is_empty() {
                break;
            }
            pass += 1;
            debug!(pass, pending = pending.len(), "resolving references");

            let steps: Vec<(Reference, Step)> = pending
                .iter()
                .filter_map(|uri| container.get(uri))
                .map(|cache| {
                    let reference = cache.cached().clone();
                    let step = plan(item, &reference, options);
                    (reference, step)
                })
                .collect();

            let missing: IndexSet<&String> = steps
                .iter()
                .filter_map(|(_, step)| match step {
                    Step::Fetch(location) if !documents.contains_key(location) => Some(location),
                    _ => None,
                })
                .collect();

            let fetched = try_join_all(missing.into_iter().map(|location| async move {
                let raw = self.fetcher.fetch(location).await?;
                Ok::<_, AppError>((location.clone(), raw))
            }))
            .await?;
            documents.extend(fetched);

            for (reference, step) in steps {
                let loaded = match step {
                    Step::Ready(loaded) => loaded,
                    Step::Local => reference.resolve(&item.content),
                    Step::Fetch(location) => match documents.get(&location) {
                        Some(raw) => reference.resolve(raw),
                        None => reference.acknowledge_absent(),
                    },
                }
                .rebase(|uri| item.canonical_uri(uri));
                let dependencies = loaded.dependencies.clone();
                container = container.update(loaded).create(dependencies);
            }
        }

        Ok(container)
    }
}

/// Decides how `reference` is loaded under `options`.
fn plan(item: &Item, reference: &Reference, options: &ResolverOptions) -> Step {
    let data_uri = reference.data_uri();

    if let Some(custom) = options.resolve.override_for(&reference.uri, data_uri) {
        if !custom.resolve {
            debug!(uri = %reference.uri, "resolution disabled by override");
            return Step::Ready(reference.acknowledge_absent());
        }
        if let Some(value) = &custom.value {
            debug!(uri = %reference.uri, "using override value");
            return Step::Ready(inject(reference, value));
        }
    }

    let Some(data_uri) = data_uri else {
        return Step::Ready(reference.mark_resolved());
    };

    if item.is_local(data_uri) {
        if options.resolve.local {
            return Step::Local;
        }
        warn!(uri = %reference.uri, "local resolution disabled, leaving reference empty");
        return Step::Ready(reference.acknowledge_absent());
    }

    let location = item.resolve_location(data_uri);
    if !options.resolve.remote || (options.base == BaseMode::Local && is_remote(&location)) {
        warn!(uri = %reference.uri, %location, "remote resolution disabled, leaving reference empty");
        return Step::Ready(reference.acknowledge_absent());
    }
    Step::Fetch(location)
}

fn inject(reference: &Reference, value: &serde_json::Value) -> Reference {
    match reference.kind {
        ReferenceKind::JsonSchema => reference.resolve_value(value.clone()),
        ReferenceKind::LateResolution | ReferenceKind::Exotic => Reference {
            value: params::literal(value),
            ..reference.mark_resolved()
        },
    }
}
