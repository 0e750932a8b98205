//! Resolver configuration.

use std::time::Duration;

use crate::capability::NETWORKGRAPH;

/// Poll interval while waiting for the remote resource.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(150);

/// Deadline for the remote fallback, measured from the start of that strategy.
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_millis(100_000);

/// Default remote loader for the network graph module.
pub const DEFAULT_REMOTE_URL: &str = "https://code.highcharts.com/modules/networkgraph.js";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Capability (and module) name to resolve.
    pub capability: String,
    /// URL injected by the remote fallback.
    pub remote_url: String,
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl ResolverConfig {
    pub fn new(capability: impl Into<String>, remote_url: impl Into<String>) -> Self {
        Self {
            capability: capability.into(),
            remote_url: remote_url.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::new(NETWORKGRAPH, DEFAULT_REMOTE_URL)
    }
}
