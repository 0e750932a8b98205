//! Library for the `langtree` binary: subcommand runners and output rendering.
//!
//! - [`repos`]: `langtree repos`, organization repositories as a table or JSON.
//! - [`resolve`]: `langtree resolve`, the module resolver wired to HTTP collaborators.
//! - [`logging`]: subscriber setup (stderr, optional file).

pub mod logging;
pub mod repos;
pub mod resolve;

pub use repos::{render_json, render_table, run_repos, ReposCommandError, ReposFormat};
pub use resolve::{build_resolver, default_cache_dir, outcome_line, run_resolve, ResolveOptions};
