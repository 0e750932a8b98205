//! Module availability resolver: settles, exactly once, whether a capability is usable.
//!
//! Strategies run strictly in order and the first success wins:
//!
//! 1. **Static**: invoke the pre-linked [`Initializer`](crate::capability::Initializer).
//! 2. **Dynamic**: fetch the module through a [`ModuleSource`](crate::capability::ModuleSource)
//!    and invoke it.
//! 3. **Remote**: inject an external resource through a
//!    [`ResourceInjector`](crate::capability::ResourceInjector) and poll the registry every
//!    [`DEFAULT_POLL_INTERVAL`] until it reports the capability or [`DEFAULT_REMOTE_TIMEOUT`]
//!    elapses.
//!
//! Cancellation through a [`CancellationToken`](tokio_util::sync::CancellationToken) settles
//! [`Unavailable::Cancelled`] and removes any injected resource.

mod chain;
mod config;
mod state;

pub use chain::CapabilityResolver;
pub use config::{ResolverConfig, DEFAULT_POLL_INTERVAL, DEFAULT_REMOTE_TIMEOUT, DEFAULT_REMOTE_URL};
pub use state::{Outcome, ResolveError, ResolverState, Strategy, StrategyFailure, Unavailable};
