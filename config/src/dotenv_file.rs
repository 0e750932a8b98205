//! Read the project `.env` as a key/value map without touching the process environment.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::LoadError;

fn dotenv_path(override_dir: Option<&Path>) -> Option<PathBuf> {
    let dir = match override_dir {
        Some(d) => d.to_path_buf(),
        None => std::env::current_dir().ok()?,
    };
    Some(dir.join(".env"))
}

/// Entries of `<dir>/.env` (`override_dir` or the current directory). Missing file yields an
/// empty map.
pub(crate) fn load_env_map(override_dir: Option<&Path>) -> Result<HashMap<String, String>, LoadError> {
    let Some(path) = dotenv_path(override_dir) else {
        return Ok(HashMap::new());
    };
    if !path.is_file() {
        return Ok(HashMap::new());
    }
    let mut map = HashMap::new();
    for item in dotenv::from_path_iter(&path)? {
        let (key, value) = item?;
        map.insert(key, value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let map = load_env_map(Some(dir.path())).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn parses_comments_quotes_and_export() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".env"),
            "# token for the org listing\nGITHUB_TOKEN=abc123\nLANGTREE_ORG=\"rust-lang\"\n\nexport LANGTREE_POLL_INTERVAL_MS=75\n",
        )
        .unwrap();
        let map = load_env_map(Some(dir.path())).unwrap();
        assert_eq!(map.get("GITHUB_TOKEN").map(String::as_str), Some("abc123"));
        assert_eq!(map.get("LANGTREE_ORG").map(String::as_str), Some("rust-lang"));
        assert_eq!(
            map.get("LANGTREE_POLL_INTERVAL_MS").map(String::as_str),
            Some("75")
        );
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn malformed_line_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "NOT A PAIR\n").unwrap();
        let result = load_env_map(Some(dir.path()));
        assert!(matches!(result, Err(LoadError::DotenvRead(_))));
    }
}
