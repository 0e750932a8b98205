use std::process::Command;

/// Runs the binary in an empty working directory with an empty XDG config home, so no
/// local `.env` or `config.toml` leaks into the run.
fn run_langtree(args: &[&str]) -> std::process::Output {
    let home = tempfile::tempdir().unwrap();
    Command::new(env!("CARGO_BIN_EXE_langtree"))
        .args(args)
        .current_dir(home.path())
        .env("XDG_CONFIG_HOME", home.path())
        .env_remove("LANGTREE_ORG")
        .env_remove("LANGTREE_REGISTRY_URL")
        .env_remove("LANGTREE_MODULE")
        .env_remove("LANGTREE_LOG_FILE")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run langtree binary")
}

#[test]
fn cli_help_lists_subcommands() {
    let out = run_langtree(&["--help"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("repos"));
    assert!(stdout.contains("resolve"));
}

#[test]
fn cli_repos_blank_org_fails_with_message() {
    let out = run_langtree(&["repos", "   "]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Enter a GitHub organization."));
    assert!(out.stdout.is_empty());
}

#[test]
fn cli_resolve_static_is_ready() {
    let cache = tempfile::tempdir().unwrap();
    let cache_dir = cache.path().to_string_lossy().to_string();
    let out = run_langtree(&["resolve", "--cache-dir", &cache_dir]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(stdout.trim(), "ready (static)");
}

#[test]
fn cli_resolve_without_sources_times_out() {
    let cache = tempfile::tempdir().unwrap();
    let cache_dir = cache.path().to_string_lossy().to_string();
    let out = run_langtree(&[
        "resolve",
        "--no-static",
        "--remote-url",
        "http://127.0.0.1:9/networkgraph.js",
        "--timeout-ms",
        "300",
        "--poll-interval-ms",
        "50",
        "--cache-dir",
        &cache_dir,
    ]);
    assert!(!out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("unavailable: "), "got {}", stdout);
    assert!(stdout.contains("300"), "got {}", stdout);
}
