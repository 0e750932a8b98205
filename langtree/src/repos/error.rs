//! Repository fetch errors.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepoFetchError {
    #[error("organization name is empty")]
    EmptyOrganization,
    #[error("organization {0:?} not found")]
    OrgNotFound(String),
    #[error("API error: status {status}")]
    Api { status: u16 },
    #[error("invalid API base {0}")]
    InvalidApiBase(String),
    #[error("transport: {0}")]
    Transport(String),
    #[error("decode page {page}: {message}")]
    Decode { page: u32, message: String },
}

impl RepoFetchError {
    /// Inline message for the user. Not-found gets its own text; everything else is
    /// reported as a retryable network/API problem.
    pub fn user_message(&self) -> String {
        match self {
            RepoFetchError::EmptyOrganization => "Enter a GitHub organization.".to_string(),
            RepoFetchError::OrgNotFound(org) => format!("Organization \"{}\" not found", org),
            _ => "⚠ Network or API error.".to_string(),
        }
    }
}
