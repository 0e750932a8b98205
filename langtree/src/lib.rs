//! # langtree
//!
//! Support library for the language-tree / organization-repositories dashboard.
//!
//! ## Main modules
//!
//! - [`capability`]: the shared capability handle ([`CapabilityRegistry`], [`InMemoryRegistry`])
//!   and the collaborators used to obtain a capability: [`Initializer`], [`ModuleSource`]
//!   ([`HttpModuleSource`]) and [`ResourceInjector`] ([`DownloadInjector`]).
//! - [`resolver`]: [`CapabilityResolver`], the static → dynamic → remote fallback chain with
//!   cancellation and a polling deadline.
//! - [`repos`]: [`OrgRepoClient`], paginated `GET /orgs/{org}/repos` with not-found vs. API
//!   error classification.
//! - [`http`]: [`HttpClient`] abstraction and [`ReqwestHttpClient`].
//!
//! Key types are re-exported at crate root.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use langtree::{
//!     registering_initializer, CapabilityResolver, DownloadInjector, InMemoryRegistry,
//!     ResolverConfig,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let registry = Arc::new(InMemoryRegistry::new());
//! let injector = Arc::new(DownloadInjector::new(
//!     std::env::temp_dir().join("langtree"),
//!     "networkgraph",
//!     registry.clone(),
//! ));
//! let resolver = CapabilityResolver::new(ResolverConfig::default(), registry, injector)
//!     .with_static_initializer(registering_initializer(["networkgraph"]));
//!
//! let cancel = CancellationToken::new();
//! match resolver.resolve(&cancel).await {
//!     Ok(outcome) => println!("{:?}", outcome),
//!     Err(e) => eprintln!("error: {}", e),
//! }
//! # }
//! ```

pub mod capability;
pub mod http;
pub mod repos;
pub mod resolver;

pub use capability::{
    registering_initializer, CapabilityRegistry, DownloadInjector, HttpModuleSource,
    InMemoryRegistry, InitError, Initializer, InjectError, LoadedModule, ModuleError,
    ModuleManifest, ModuleSource, ResourceHandle, ResourceInjector, NETWORKGRAPH,
};
pub use http::{HttpClient, HttpResponse, ReqwestHttpClient};
pub use repos::{OrgRepoClient, RepoFetchError, RepoRecord};
pub use resolver::{
    CapabilityResolver, Outcome, ResolveError, ResolverConfig, ResolverState, Strategy,
    StrategyFailure, Unavailable,
};
