//! Load configuration from XDG `config.toml` and project `.env`, then apply to the process
//! environment with priority: **existing env > .env > XDG**.
//!
//! Typed settings for the CLI (`[repos]`, `[resolver]`) come from [`Settings::load`], which
//! reads the same `config.toml` and lets env variables override each field.

mod dotenv_file;
mod settings;
mod xdg_toml;

use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

pub use settings::{
    RepoSection, RepoSettings, ResolverSection, ResolverSettings, Settings, ENV_API_BASE,
    ENV_GITHUB_TOKEN, ENV_MODULE, ENV_ORG, ENV_POLL_INTERVAL_MS, ENV_REGISTRY_URL,
    ENV_REMOTE_URL, ENV_RESOLVE_TIMEOUT_MS,
};
pub use xdg_toml::config_path;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("xdg config path: {0}")]
    XdgPath(String),
    #[error("read xdg config: {0}")]
    XdgRead(std::io::Error),
    #[error("parse xdg toml: {0}")]
    XdgParse(#[from] toml::de::Error),
    #[error("read .env: {0}")]
    DotenvRead(#[from] dotenv::Error),
}

/// Loads `[env]` from XDG `config.toml` and the optional project `.env`, then sets
/// environment variables only for keys that are **not** already set.
///
/// When a key is missing in the process environment:
/// 1. Value from project `.env` (current directory or `override_dir` if given)
/// 2. Value from `$XDG_CONFIG_HOME/<app_name>/config.toml` `[env]` table
pub fn load_and_apply(app_name: &str, override_dir: Option<&Path>) -> Result<(), LoadError> {
    let xdg_map = xdg_toml::load_config_file(app_name)?.env;
    let dotenv_map = dotenv_file::load_env_map(override_dir)?;

    let mut keys: HashSet<&String> = xdg_map.keys().collect();
    keys.extend(dotenv_map.keys());

    for key in keys {
        if std::env::var_os(key).is_some() {
            continue;
        }
        if let Some(v) = dotenv_map.get(key).or_else(|| xdg_map.get(key)) {
            std::env::set_var(key, v);
        }
    }

    Ok(())
}

/// Serializes tests that mutate `XDG_CONFIG_HOME`.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
