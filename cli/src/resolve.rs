//! `langtree resolve`: run the capability resolver with the built-in collaborators.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use langtree::{
    registering_initializer, CapabilityRegistry, CapabilityResolver, DownloadInjector,
    HttpModuleSource, InMemoryRegistry, Outcome, ResolveError, ResolverConfig, Unavailable,
};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOptions {
    pub module: String,
    pub remote_url: String,
    /// Module registry for the dynamic strategy; `None` makes that strategy fail fast.
    pub registry_url: Option<String>,
    pub poll_interval: Duration,
    pub timeout: Duration,
    /// Where the remote fallback stores downloaded resources.
    pub cache_dir: PathBuf,
    /// Link the built-in initializer as the static strategy.
    pub use_static: bool,
}

/// Default download directory: `<tmp>/langtree`.
pub fn default_cache_dir() -> PathBuf {
    std::env::temp_dir().join("langtree")
}

/// Resolver wired to a fresh [`InMemoryRegistry`] (also returned for inspection).
pub fn build_resolver(opts: &ResolveOptions) -> (CapabilityResolver, Arc<InMemoryRegistry>) {
    let registry = Arc::new(InMemoryRegistry::new());
    let shared: Arc<dyn CapabilityRegistry> = registry.clone();
    let injector = Arc::new(DownloadInjector::new(
        &opts.cache_dir,
        opts.module.clone(),
        shared.clone(),
    ));
    let config = ResolverConfig::new(opts.module.clone(), opts.remote_url.clone())
        .with_poll_interval(opts.poll_interval)
        .with_timeout(opts.timeout);

    let mut resolver = CapabilityResolver::new(config, shared, injector);
    if opts.use_static {
        resolver = resolver.with_static_initializer(registering_initializer([opts.module.clone()]));
    }
    if let Some(url) = &opts.registry_url {
        resolver = resolver.with_module_source(Arc::new(HttpModuleSource::new(url.clone())));
    }
    (resolver, registry)
}

/// One-line summary printed on stdout.
pub fn outcome_line(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Ready(strategy) => format!("ready ({})", strategy),
        Outcome::Unavailable(Unavailable::Cancelled) => "cancelled".to_string(),
        Outcome::Unavailable(reason) => format!("unavailable: {}", reason),
    }
}

/// Runs the resolver until it settles or `cancel` fires.
pub async fn run_resolve(
    opts: &ResolveOptions,
    cancel: &CancellationToken,
) -> Result<Outcome, ResolveError> {
    let (resolver, _registry) = build_resolver(opts);
    tracing::debug!(
        module = %opts.module,
        static_linked = opts.use_static,
        registry = opts.registry_url.as_deref().unwrap_or("-"),
        "resolving module"
    );
    resolver.resolve(cancel).await
}
