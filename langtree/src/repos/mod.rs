//! GitHub organization repositories: paginated fetch with not-found/API error classification.

mod client;
mod error;
mod record;

pub use client::{OrgRepoClient, GITHUB_ACCEPT, PER_PAGE};
pub use error::RepoFetchError;
pub use record::RepoRecord;
