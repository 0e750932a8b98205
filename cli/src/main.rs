//! langtree CLI binary: list an organization's repositories or resolve the network graph
//! module.
//!
//! Subcommands: `repos` (repository table / JSON), `resolve` (static → dynamic → remote).

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use cli::{outcome_line, run_repos, run_resolve, ReposFormat, ResolveOptions};
use config::Settings;
use langtree::OrgRepoClient;
use tokio_util::sync::CancellationToken;

const APP_NAME: &str = "langtree";

#[derive(Parser, Debug)]
#[command(name = "langtree")]
#[command(about = "langtree: organization repositories and network graph module loading")]
struct Args {
    #[command(subcommand)]
    cmd: Command,

    /// Verbose: debug logs for strategy progress and HTTP paging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// List every repository of a GitHub organization
    Repos(ReposArgs),
    /// Make the network graph module available (static, dynamic, then remote)
    Resolve(ResolveArgs),
}

#[derive(clap::Args, Debug, Clone)]
struct ReposArgs {
    /// Organization login (default: LANGTREE_ORG or `[repos] org`)
    org: Option<String>,
    /// Print a JSON array instead of a table
    #[arg(long)]
    json: bool,
    /// With --json, pretty-print (multi-line)
    #[arg(long)]
    pretty: bool,
}

#[derive(clap::Args, Debug, Clone)]
struct ResolveArgs {
    /// Skip the built-in static initializer
    #[arg(long)]
    no_static: bool,
    /// Module registry for the dynamic strategy (`{url}/{module}.json`)
    #[arg(long, value_name = "URL")]
    registry_url: Option<String>,
    /// Loader resource injected by the remote fallback
    #[arg(long, value_name = "URL")]
    remote_url: Option<String>,
    /// Remote fallback deadline in milliseconds
    #[arg(long, value_name = "N")]
    timeout_ms: Option<u64>,
    /// Poll interval in milliseconds while waiting for the remote resource
    #[arg(long, value_name = "N")]
    poll_interval_ms: Option<u64>,
    /// Download directory for the remote resource (default: <tmp>/langtree)
    #[arg(long, value_name = "DIR")]
    cache_dir: Option<PathBuf>,
}

fn resolve_options(args: ResolveArgs, settings: &Settings) -> ResolveOptions {
    let s = &settings.resolver;
    ResolveOptions {
        module: s.module.clone(),
        remote_url: args.remote_url.unwrap_or_else(|| s.remote_url.clone()),
        registry_url: args.registry_url.or_else(|| s.registry_url.clone()),
        poll_interval: Duration::from_millis(args.poll_interval_ms.unwrap_or(s.poll_interval_ms)),
        timeout: Duration::from_millis(args.timeout_ms.unwrap_or(s.timeout_ms)),
        cache_dir: args.cache_dir.unwrap_or_else(cli::default_cache_dir),
        use_static: !args.no_static,
    }
}

/// Cancels `token` on Ctrl-C.
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, cancelling");
            token.cancel();
        }
    });
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    config::load_and_apply(APP_NAME, None::<&std::path::Path>).ok();
    let args = Args::parse();
    let _log_guard = cli::logging::init(args.verbose)?;

    let settings = match Settings::load(APP_NAME) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("langtree: {}", e);
            std::process::exit(1);
        }
    };

    match args.cmd {
        Command::Repos(ra) => {
            let org = ra.org.unwrap_or_else(|| settings.repos.org.clone());
            let client = OrgRepoClient::new(settings.repos.api_base.clone(), settings.repos.token.clone());
            let format = if ra.json {
                ReposFormat::Json { pretty: ra.pretty }
            } else {
                ReposFormat::Table
            };
            match run_repos(&client, &org, format).await {
                Ok(out) => println!("{}", out),
                Err(e) => {
                    tracing::error!(org = %org, error = ?e, "repository listing failed");
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            }
        }
        Command::Resolve(ra) => {
            let opts = resolve_options(ra, &settings);
            let cancel = CancellationToken::new();
            cancel_on_ctrl_c(cancel.clone());
            let outcome = run_resolve(&opts, &cancel).await?;
            println!("{}", outcome_line(&outcome));
            if !outcome.is_ready() {
                std::process::exit(1);
            }
        }
    }
    Ok(())
}
