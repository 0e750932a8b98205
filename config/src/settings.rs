//! Typed settings: `[repos]` and `[resolver]` tables of `config.toml`, overridden by env.

use serde::Deserialize;

use crate::xdg_toml;
use crate::LoadError;

pub const ENV_ORG: &str = "LANGTREE_ORG";
pub const ENV_API_BASE: &str = "LANGTREE_API_BASE";
pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";
pub const ENV_MODULE: &str = "LANGTREE_MODULE";
pub const ENV_REMOTE_URL: &str = "LANGTREE_REMOTE_URL";
pub const ENV_REGISTRY_URL: &str = "LANGTREE_REGISTRY_URL";
pub const ENV_POLL_INTERVAL_MS: &str = "LANGTREE_POLL_INTERVAL_MS";
pub const ENV_RESOLVE_TIMEOUT_MS: &str = "LANGTREE_RESOLVE_TIMEOUT_MS";

const DEFAULT_ORG: &str = "philips-software";
const DEFAULT_API_BASE: &str = "https://api.github.com";
const DEFAULT_MODULE: &str = "networkgraph";
const DEFAULT_REMOTE_URL: &str = "https://code.highcharts.com/modules/networkgraph.js";
const DEFAULT_POLL_INTERVAL_MS: u64 = 150;
const DEFAULT_RESOLVE_TIMEOUT_MS: u64 = 100_000;

/// `[repos]` as written in the file; every field optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RepoSection {
    pub org: Option<String>,
    pub api_base: Option<String>,
    pub token: Option<String>,
}

/// `[resolver]` as written in the file; every field optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResolverSection {
    pub module: Option<String>,
    pub remote_url: Option<String>,
    pub registry_url: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSettings {
    pub org: String,
    pub api_base: String,
    pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverSettings {
    pub module: String,
    pub remote_url: String,
    pub registry_url: Option<String>,
    pub poll_interval_ms: u64,
    pub timeout_ms: u64,
}

/// Effective settings: env > `config.toml` section > built-in default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub repos: RepoSettings,
    pub resolver: ResolverSettings,
}

impl Settings {
    /// Reads the app's `config.toml` and applies process env overrides.
    pub fn load(app_name: &str) -> Result<Self, LoadError> {
        let file = xdg_toml::load_config_file(app_name)?;
        Ok(Self::resolve(file.repos, file.resolver, |key| {
            std::env::var(key).ok()
        }))
    }

    /// Merges file sections with values from `lookup` (env). Blank or unparsable env values
    /// are ignored.
    pub fn resolve(
        repos: RepoSection,
        resolver: ResolverSection,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let text = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let millis = |key: &str| text(key).and_then(|v| v.trim().parse::<u64>().ok());

        Settings {
            repos: RepoSettings {
                org: text(ENV_ORG)
                    .or(repos.org)
                    .unwrap_or_else(|| DEFAULT_ORG.to_string()),
                api_base: text(ENV_API_BASE)
                    .or(repos.api_base)
                    .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
                token: text(ENV_GITHUB_TOKEN).or(repos.token),
            },
            resolver: ResolverSettings {
                module: text(ENV_MODULE)
                    .or(resolver.module)
                    .unwrap_or_else(|| DEFAULT_MODULE.to_string()),
                remote_url: text(ENV_REMOTE_URL)
                    .or(resolver.remote_url)
                    .unwrap_or_else(|| DEFAULT_REMOTE_URL.to_string()),
                registry_url: text(ENV_REGISTRY_URL).or(resolver.registry_url),
                poll_interval_ms: millis(ENV_POLL_INTERVAL_MS)
                    .or(resolver.poll_interval_ms)
                    .unwrap_or(DEFAULT_POLL_INTERVAL_MS),
                timeout_ms: millis(ENV_RESOLVE_TIMEOUT_MS)
                    .or(resolver.timeout_ms)
                    .unwrap_or(DEFAULT_RESOLVE_TIMEOUT_MS),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_configured() {
        let s = Settings::resolve(RepoSection::default(), ResolverSection::default(), env(&[]));
        assert_eq!(s.repos.org, "philips-software");
        assert_eq!(s.repos.api_base, "https://api.github.com");
        assert!(s.repos.token.is_none());
        assert_eq!(s.resolver.module, "networkgraph");
        assert_eq!(
            s.resolver.remote_url,
            "https://code.highcharts.com/modules/networkgraph.js"
        );
        assert!(s.resolver.registry_url.is_none());
        assert_eq!(s.resolver.poll_interval_ms, 150);
        assert_eq!(s.resolver.timeout_ms, 100_000);
    }

    #[test]
    fn env_overrides_file_which_overrides_default() {
        let repos = RepoSection {
            org: Some("from-file".to_string()),
            api_base: Some("https://ghe.example.com/api/v3".to_string()),
            token: None,
        };
        let resolver = ResolverSection {
            poll_interval_ms: Some(75),
            timeout_ms: Some(5_000),
            ..Default::default()
        };
        let s = Settings::resolve(
            repos,
            resolver,
            env(&[(ENV_ORG, "from-env"), (ENV_RESOLVE_TIMEOUT_MS, "250")]),
        );
        assert_eq!(s.repos.org, "from-env");
        assert_eq!(s.repos.api_base, "https://ghe.example.com/api/v3");
        assert_eq!(s.resolver.poll_interval_ms, 75);
        assert_eq!(s.resolver.timeout_ms, 250);
    }

    #[test]
    fn blank_or_invalid_env_is_ignored() {
        let resolver = ResolverSection {
            poll_interval_ms: Some(75),
            ..Default::default()
        };
        let s = Settings::resolve(
            RepoSection::default(),
            resolver,
            env(&[
                (ENV_ORG, "   "),
                (ENV_POLL_INTERVAL_MS, "fast"),
                (ENV_GITHUB_TOKEN, ""),
            ]),
        );
        assert_eq!(s.repos.org, "philips-software");
        assert_eq!(s.resolver.poll_interval_ms, 75);
        assert!(s.repos.token.is_none());
    }
}
