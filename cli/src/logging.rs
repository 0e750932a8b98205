//! Logging initialization: logs go to stderr so stdout stays clean for command output.
//!
//! - **RUST_LOG**: filter directives. Default: `warn`, or `warn,langtree=debug,cli=debug`
//!   with `--verbose`.
//! - **LANGTREE_LOG_FILE**: when set, logs are also appended to this file (plain text, no
//!   ANSI) through a non-blocking writer.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub const ENV_LOG_FILE: &str = "LANGTREE_LOG_FILE";

/// Filter used when `RUST_LOG` is unset.
pub fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "warn,langtree=debug,cli=debug"
    } else {
        "warn"
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)))
}

/// Splits a log file path into the directory and file name `tracing_appender` expects.
fn split_log_path(path: &Path) -> Result<(PathBuf, PathBuf), String> {
    let file_name = path
        .file_name()
        .ok_or_else(|| format!("{} has no file name", path.display()))?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, PathBuf::from(file_name)))
}

/// Installs the global subscriber. Keep the returned guard alive until exit so buffered
/// file logs are flushed.
pub fn init(verbose: bool) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(env_filter(verbose));

    let Some(path) = std::env::var_os(ENV_LOG_FILE).filter(|v| !v.is_empty()) else {
        tracing_subscriber::registry().with(stderr_layer).try_init()?;
        return Ok(None);
    };

    let path = PathBuf::from(path);
    let (dir, file_name) = split_log_path(&path)?;
    std::fs::create_dir_all(&dir)?;
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_filter(env_filter(verbose));
    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;
    tracing::info!(path = %path.display(), "langtree logging to file");
    Ok(Some(guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_enables_debug_for_crates() {
        assert_eq!(default_directives(false), "warn");
        assert!(default_directives(true).contains("langtree=debug"));
    }

    #[test]
    fn split_log_path_uses_current_dir_for_bare_name() {
        let (dir, name) = split_log_path(Path::new("langtree.log")).unwrap();
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(name, PathBuf::from("langtree.log"));
    }

    #[test]
    fn split_log_path_keeps_parent() {
        let (dir, name) = split_log_path(Path::new("/var/log/langtree/run.log")).unwrap();
        assert_eq!(dir, PathBuf::from("/var/log/langtree"));
        assert_eq!(name, PathBuf::from("run.log"));
    }

    #[test]
    fn split_log_path_rejects_missing_file_name() {
        assert!(split_log_path(Path::new("/")).is_err());
    }
}
