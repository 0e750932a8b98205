//! Capability registry: the shared handle that reports whether a plugin capability
//! (e.g. the `networkgraph` series type) is present, plus the collaborators the
//! resolver uses to obtain it.
//!
//! - [`CapabilityRegistry`]: `has_capability` / `register_capability`; [`InMemoryRegistry`].
//! - [`Initializer`]: a pre-linked or fetched init function run against the registry.
//! - [`ModuleSource`]: on-demand module fetch ([`HttpModuleSource`]).
//! - [`ResourceInjector`]: injects an external loader resource ([`DownloadInjector`]).

mod inject;
mod source;

pub use inject::{DownloadInjector, InjectError, ResourceHandle, ResourceInjector};
pub use source::{HttpModuleSource, LoadedModule, ModuleError, ModuleManifest, ModuleSource};

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, RwLock};

use thiserror::Error;

/// Capability name of the network graph series type.
pub const NETWORKGRAPH: &str = "networkgraph";

/// Shared capability handle. Consumers treat it as read-only; only initializers and
/// injected resources register capabilities.
pub trait CapabilityRegistry: Send + Sync {
    /// Whether `name` is currently registered and usable.
    fn has_capability(&self, name: &str) -> bool;

    /// Registers `name`. Registering twice is a no-op.
    fn register_capability(&self, name: &str);
}

/// Error raised by an [`Initializer`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct InitError(pub String);

/// Init function run against the registry (static or dynamically loaded).
pub type Initializer =
    Arc<dyn Fn(&dyn CapabilityRegistry) -> Result<(), InitError> + Send + Sync>;

/// Builds an initializer that registers every name in `provides`.
pub fn registering_initializer<I, S>(provides: I) -> Initializer
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let names: Vec<String> = provides.into_iter().map(Into::into).collect();
    Arc::new(move |registry: &dyn CapabilityRegistry| -> Result<(), InitError> {
        for name in &names {
            registry.register_capability(name);
        }
        Ok(())
    })
}

/// Runs `init` against `registry`, turning a panic into an [`InitError`].
pub(crate) fn invoke_initializer(
    init: &Initializer,
    registry: &dyn CapabilityRegistry,
) -> Result<(), InitError> {
    match panic::catch_unwind(AssertUnwindSafe(|| init(registry))) {
        Ok(result) => result,
        Err(payload) => {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "initializer panicked".to_string());
            Err(InitError(format!("panic: {}", msg)))
        }
    }
}

/// In-memory registry of capability names.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    names: RwLock<HashSet<String>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let guard = self.names.read().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<String> = guard.iter().cloned().collect();
        names.sort();
        names
    }
}

impl CapabilityRegistry for InMemoryRegistry {
    fn has_capability(&self, name: &str) -> bool {
        self.names
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(name)
    }

    fn register_capability(&self, name: &str) {
        let inserted = self
            .names
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.to_string());
        if inserted {
            tracing::debug!(capability = name, "capability registered");
        }
    }
}
