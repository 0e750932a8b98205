//! Read `$XDG_CONFIG_HOME/<app>/config.toml`: the `[env]` table plus typed sections.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::settings::{RepoSection, ResolverSection};
use crate::LoadError;

/// `$XDG_CONFIG_HOME` when set and non-empty, else `~/.config`.
fn config_home() -> Result<PathBuf, LoadError> {
    if let Some(dir) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".config"))
        .ok_or_else(|| LoadError::XdgPath("no home directory".to_string()))
}

/// Path of the app's `config.toml`, whether or not it exists.
pub fn config_path(app_name: &str) -> Result<PathBuf, LoadError> {
    Ok(config_home()?.join(app_name).join("config.toml"))
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct ConfigFile {
    #[serde(default)]
    pub env: HashMap<String, String>,
    #[serde(default)]
    pub repos: RepoSection,
    #[serde(default)]
    pub resolver: ResolverSection,
}

/// Parsed `config.toml`; a missing file yields the empty default.
pub(crate) fn load_config_file(app_name: &str) -> Result<ConfigFile, LoadError> {
    let path = config_path(app_name)?;
    if !path.is_file() {
        return Ok(ConfigFile::default());
    }
    let content = std::fs::read_to_string(&path).map_err(LoadError::XdgRead)?;
    Ok(toml::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    /// Runs `f` with `XDG_CONFIG_HOME` pointed at `dir`, restoring the previous value.
    fn with_xdg<T>(dir: &std::path::Path, f: impl FnOnce() -> T) -> T {
        let _guard = crate::ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let prev = env::var("XDG_CONFIG_HOME").ok();
        env::set_var("XDG_CONFIG_HOME", dir);
        let out = f();
        match prev {
            Some(p) => env::set_var("XDG_CONFIG_HOME", p),
            None => env::remove_var("XDG_CONFIG_HOME"),
        }
        out
    }

    #[test]
    fn missing_config_returns_default() {
        let file = load_config_file("config-crate-test-nonexistent-12345").unwrap();
        assert!(file.env.is_empty());
        assert!(file.repos.org.is_none());
    }

    #[test]
    fn reads_env_and_typed_sections() {
        let dir = tempfile::tempdir().unwrap();
        let app_dir = dir.path().join("xdgtypedapp");
        std::fs::create_dir_all(&app_dir).unwrap();
        std::fs::write(
            app_dir.join("config.toml"),
            r#"
[env]
FOO = "from_toml"

[repos]
org = "rust-lang"

[resolver]
poll_interval_ms = 50
remote_url = "https://cdn.example.com/networkgraph.js"
"#,
        )
        .unwrap();

        let file = with_xdg(dir.path(), || load_config_file("xdgtypedapp")).unwrap();
        assert_eq!(file.env.get("FOO"), Some(&"from_toml".to_string()));
        assert_eq!(file.repos.org.as_deref(), Some("rust-lang"));
        assert_eq!(file.resolver.poll_interval_ms, Some(50));
        assert_eq!(
            file.resolver.remote_url.as_deref(),
            Some("https://cdn.example.com/networkgraph.js")
        );
        assert!(file.resolver.timeout_ms.is_none());
    }

    #[test]
    fn invalid_toml_returns_xdg_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let app_dir = dir.path().join("xdgbadapp");
        std::fs::create_dir_all(&app_dir).unwrap();
        std::fs::write(app_dir.join("config.toml"), "not valid toml [[[\n").unwrap();

        let result = with_xdg(dir.path(), || load_config_file("xdgbadapp"));
        assert!(matches!(result, Err(LoadError::XdgParse(_))));
    }

    #[test]
    fn config_path_joins_app_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = with_xdg(dir.path(), || config_path("langtree")).unwrap();
        assert_eq!(path, dir.path().join("langtree").join("config.toml"));
    }
}
