//! Fallback chain: static initializer, dynamic module fetch, remote resource with polling.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::config::ResolverConfig;
use super::state::{Outcome, ResolveError, ResolverState, Strategy, StrategyFailure, Unavailable};
use crate::capability::{
    invoke_initializer, CapabilityRegistry, Initializer, LoadedModule, ModuleSource,
    ResourceHandle, ResourceInjector,
};

/// How one strategy ended when it did not succeed.
enum StepError {
    Failed(StrategyFailure),
    Cancelled,
}

impl From<StrategyFailure> for StepError {
    fn from(failure: StrategyFailure) -> Self {
        StepError::Failed(failure)
    }
}

struct Inner {
    state: ResolverState,
    outcome: Option<Outcome>,
    in_flight: bool,
    injected: Option<ResourceHandle>,
}

/// Obtains a capability by trying, in order, a statically linked initializer, a
/// dynamically fetched module and a remote resource, settling exactly once.
///
/// ```no_run
/// use std::sync::Arc;
/// use langtree::capability::{DownloadInjector, InMemoryRegistry, registering_initializer};
/// use langtree::resolver::{CapabilityResolver, ResolverConfig};
/// use tokio_util::sync::CancellationToken;
/// # #[tokio::main]
/// # async fn main() {
/// let registry = Arc::new(InMemoryRegistry::new());
/// let injector = Arc::new(DownloadInjector::new("/tmp/langtree", "networkgraph", registry.clone()));
/// let resolver = CapabilityResolver::new(ResolverConfig::default(), registry, injector)
///     .with_static_initializer(registering_initializer(["networkgraph"]));
/// let outcome = resolver.resolve(&CancellationToken::new()).await.unwrap();
/// assert!(outcome.is_ready());
/// # }
/// ```
pub struct CapabilityResolver {
    config: ResolverConfig,
    registry: Arc<dyn CapabilityRegistry>,
    static_init: Option<Initializer>,
    source: Option<Arc<dyn ModuleSource>>,
    injector: Arc<dyn ResourceInjector>,
    inner: Mutex<Inner>,
}

/// Clears `in_flight` if the resolve future is dropped before settling.
struct InFlightGuard<'a> {
    resolver: &'a CapabilityResolver,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.resolver.lock().in_flight = false;
    }
}

impl CapabilityResolver {
    pub fn new(
        config: ResolverConfig,
        registry: Arc<dyn CapabilityRegistry>,
        injector: Arc<dyn ResourceInjector>,
    ) -> Self {
        Self {
            config,
            registry,
            static_init: None,
            source: None,
            injector,
            inner: Mutex::new(Inner {
                state: ResolverState::Pending,
                outcome: None,
                in_flight: false,
                injected: None,
            }),
        }
    }

    /// Pre-linked initializer for the static strategy.
    pub fn with_static_initializer(mut self, init: Initializer) -> Self {
        self.static_init = Some(init);
        self
    }

    /// Module source for the dynamic strategy.
    pub fn with_module_source(mut self, source: Arc<dyn ModuleSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn state(&self) -> ResolverState {
        self.lock().state
    }

    /// Resource injected by the remote fallback and still in place.
    pub fn injected(&self) -> Option<ResourceHandle> {
        self.lock().injected.clone()
    }

    /// Removes the injected resource, if any. Does not change the settled state.
    pub fn teardown(&self) {
        let handle = self.lock().injected.take();
        if let Some(handle) = handle {
            tracing::debug!(url = handle.url(), "teardown: removing injected resource");
            self.injector.remove(&handle);
        }
    }

    /// Runs the chain and settles. Once settled, later calls return the same outcome
    /// without running any strategy; a call while another is running is rejected.
    pub async fn resolve(&self, cancel: &CancellationToken) -> Result<Outcome, ResolveError> {
        {
            let mut inner = self.lock();
            if let Some(ref outcome) = inner.outcome {
                return Ok(outcome.clone());
            }
            if inner.in_flight {
                return Err(ResolveError::ConcurrentResolve);
            }
            inner.in_flight = true;
        }
        let _guard = InFlightGuard { resolver: self };

        let outcome = self.run(cancel).await;
        match &outcome {
            Outcome::Ready(strategy) => {
                tracing::info!(capability = %self.config.capability, %strategy, "capability ready")
            }
            Outcome::Unavailable(Unavailable::Cancelled) => {
                tracing::info!(capability = %self.config.capability, "capability resolution cancelled")
            }
            Outcome::Unavailable(reason) => {
                tracing::error!(capability = %self.config.capability, %reason, "capability unavailable")
            }
        }

        let mut inner = self.lock();
        inner.state = outcome.state();
        inner.outcome = Some(outcome.clone());
        Ok(outcome)
    }

    async fn run(&self, cancel: &CancellationToken) -> Outcome {
        let name = self.config.capability.as_str();
        if cancel.is_cancelled() {
            return self.cancelled();
        }
        if self.registry.has_capability(name) {
            return Outcome::Ready(Strategy::AlreadyAvailable);
        }

        let mut failures = Vec::new();

        match self.try_static() {
            Ok(()) => return Outcome::Ready(Strategy::Static),
            Err(failure) => {
                tracing::warn!(capability = name, %failure, "static strategy failed");
                failures.push(failure);
            }
        }

        if cancel.is_cancelled() {
            return self.cancelled();
        }
        match self.try_dynamic(cancel).await {
            Ok(()) => return Outcome::Ready(Strategy::Dynamic),
            Err(StepError::Cancelled) => return self.cancelled(),
            Err(StepError::Failed(failure)) => {
                tracing::warn!(capability = name, %failure, "dynamic strategy failed");
                failures.push(failure);
            }
        }

        if cancel.is_cancelled() {
            return self.cancelled();
        }
        match self.try_remote(cancel).await {
            Ok(()) => return Outcome::Ready(Strategy::Remote),
            Err(StepError::Cancelled) => return self.cancelled(),
            Err(StepError::Failed(failure)) => {
                tracing::warn!(capability = name, %failure, "remote strategy failed");
                failures.push(failure);
            }
        }

        Outcome::Unavailable(Unavailable::Exhausted { failures })
    }

    fn try_static(&self) -> Result<(), StrategyFailure> {
        let init = self.static_init.as_ref().ok_or_else(|| {
            StrategyFailure::StaticInitFailure("no static initializer linked".to_string())
        })?;
        tracing::debug!(capability = %self.config.capability, "trying static initializer");
        self.run_initializer(init)
            .map_err(StrategyFailure::StaticInitFailure)
    }

    async fn try_dynamic(&self, cancel: &CancellationToken) -> Result<(), StepError> {
        let name = self.config.capability.as_str();
        let source = self.source.as_ref().ok_or_else(|| {
            StrategyFailure::DynamicLoadFailure("no module source configured".to_string())
        })?;
        tracing::debug!(capability = name, "trying dynamic module fetch");

        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(StepError::Cancelled),
            result = source.fetch_module(name) => result,
        };
        let module = fetched.map_err(|e| StrategyFailure::DynamicLoadFailure(e.to_string()))?;
        let init = match module {
            LoadedModule::Invocable(init) => init,
            LoadedModule::NotInvocable(what) => {
                return Err(StrategyFailure::DynamicLoadFailure(format!(
                    "non-invocable module: {}",
                    what
                ))
                .into())
            }
        };
        if cancel.is_cancelled() {
            return Err(StepError::Cancelled);
        }
        self.run_initializer(&init)
            .map_err(|e| StrategyFailure::DynamicLoadFailure(e).into())
    }

    async fn try_remote(&self, cancel: &CancellationToken) -> Result<(), StepError> {
        let name = self.config.capability.as_str();
        let start = Instant::now();
        if self.registry.has_capability(name) {
            return Ok(());
        }
        if cancel.is_cancelled() {
            return Err(StepError::Cancelled);
        }

        // A resource left by an abandoned attempt is polled again instead of injected twice.
        let existing = self.lock().injected.clone();
        match existing {
            Some(handle) => {
                tracing::debug!(capability = name, url = handle.url(), "reusing injected remote resource");
            }
            None => {
                tracing::debug!(capability = name, url = %self.config.remote_url, "injecting remote resource");
                let handle = self
                    .injector
                    .inject(&self.config.remote_url)
                    .map_err(|e| StrategyFailure::RemoteInjectFailure(e.to_string()))?;
                self.lock().injected = Some(handle);
            }
        }

        loop {
            if cancel.is_cancelled() {
                return Err(StepError::Cancelled);
            }
            if self.registry.has_capability(name) {
                return Ok(());
            }
            if start.elapsed() > self.config.timeout {
                return Err(StrategyFailure::RemoteTimeout(self.config.timeout).into());
            }
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(StepError::Cancelled),
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }
    }

    /// Invokes `init`; success also requires the registry to report the capability.
    fn run_initializer(&self, init: &Initializer) -> Result<(), String> {
        invoke_initializer(init, self.registry.as_ref()).map_err(|e| e.to_string())?;
        if self.registry.has_capability(&self.config.capability) {
            Ok(())
        } else {
            Err(format!(
                "initializer completed but {} is not available",
                self.config.capability
            ))
        }
    }

    fn cancelled(&self) -> Outcome {
        self.teardown();
        Outcome::Unavailable(Unavailable::Cancelled)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
