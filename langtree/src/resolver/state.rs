//! Resolver state, outcomes and the strategy failure taxonomy.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Lifecycle of one resolution. `Ready` and `Unavailable` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    Pending,
    Ready,
    Unavailable,
}

/// Which step produced the capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Capability was present before any strategy ran.
    AlreadyAvailable,
    Static,
    Dynamic,
    Remote,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Strategy::AlreadyAvailable => "already available",
            Strategy::Static => "static",
            Strategy::Dynamic => "dynamic",
            Strategy::Remote => "remote",
        };
        f.write_str(s)
    }
}

/// Why a single strategy failed. Absorbed and logged; surfaced only on exhaustion.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StrategyFailure {
    #[error("static init failed: {0}")]
    StaticInitFailure(String),
    #[error("dynamic load failed: {0}")]
    DynamicLoadFailure(String),
    #[error("remote inject failed: {0}")]
    RemoteInjectFailure(String),
    #[error("timed out after {0:?} waiting for remote capability")]
    RemoteTimeout(Duration),
}

/// Why the capability is unavailable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    /// Every strategy failed; one entry per strategy attempted, in order.
    Exhausted { failures: Vec<StrategyFailure> },
    /// The caller cancelled before a strategy succeeded.
    Cancelled,
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unavailable::Cancelled => f.write_str("cancelled"),
            Unavailable::Exhausted { failures } => {
                f.write_str("all strategies failed")?;
                for (i, failure) in failures.iter().enumerate() {
                    write!(f, "{} {}", if i == 0 { ":" } else { ";" }, failure)?;
                }
                Ok(())
            }
        }
    }
}

/// Settled result of [`resolve`](super::CapabilityResolver::resolve). Never pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Ready(Strategy),
    Unavailable(Unavailable),
}

impl Outcome {
    pub fn state(&self) -> ResolverState {
        match self {
            Outcome::Ready(_) => ResolverState::Ready,
            Outcome::Unavailable(_) => ResolverState::Unavailable,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Outcome::Ready(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Unavailable(Unavailable::Cancelled))
    }
}

/// Caller errors from [`resolve`](super::CapabilityResolver::resolve).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("resolve already in progress")]
    ConcurrentResolve,
}
