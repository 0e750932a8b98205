//! Paginated `GET /orgs/{org}/repos` client.

use std::sync::Arc;

use super::error::RepoFetchError;
use super::record::RepoRecord;
use crate::http::{HttpClient, ReqwestHttpClient};

/// Page size requested; a shorter page is the last one.
pub const PER_PAGE: usize = 100;

/// `Accept` header recommended by the GitHub REST API.
pub const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Lists every repository of an organization, one page at a time.
pub struct OrgRepoClient {
    api_base: String,
    http_client: Arc<dyn HttpClient>,
}

impl OrgRepoClient {
    /// Reqwest client for `api_base` sending the GitHub media type and an optional bearer
    /// token.
    pub fn new(api_base: impl Into<String>, token: Option<String>) -> Self {
        Self::with_client(
            api_base,
            Arc::new(
                ReqwestHttpClient::new()
                    .with_accept(GITHUB_ACCEPT)
                    .with_bearer_token(token),
            ),
        )
    }

    /// Custom API base and HTTP client.
    pub fn with_client(api_base: impl Into<String>, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            api_base: api_base.into(),
            http_client,
        }
    }

    fn page_url(&self, org: &str, page: u32) -> Result<url::Url, RepoFetchError> {
        let invalid = |detail: String| {
            RepoFetchError::InvalidApiBase(format!("{:?}: {}", self.api_base, detail))
        };
        let mut url = url::Url::parse(&self.api_base).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["orgs", org, "repos"]);
        url.query_pairs_mut()
            .append_pair("per_page", &PER_PAGE.to_string())
            .append_pair("page", &page.to_string());
        Ok(url)
    }

    /// Fetches all pages for `org` (trimmed). Stops at an empty page or a page shorter than
    /// [`PER_PAGE`]. 404 maps to [`RepoFetchError::OrgNotFound`]; any other non-2xx status to
    /// [`RepoFetchError::Api`].
    pub async fn fetch_org_repos(&self, org: &str) -> Result<Vec<RepoRecord>, RepoFetchError> {
        let org = org.trim();
        if org.is_empty() {
            return Err(RepoFetchError::EmptyOrganization);
        }

        let mut all = Vec::new();
        let mut page: u32 = 1;
        loop {
            let url = self.page_url(org, page)?;
            tracing::debug!(org, page, url = %url, "fetching repositories page");
            let response = self
                .http_client
                .get(url.as_str())
                .await
                .map_err(RepoFetchError::Transport)?;

            if response.status == 404 {
                return Err(RepoFetchError::OrgNotFound(org.to_string()));
            }
            if !response.is_success() {
                tracing::warn!(org, page, status = response.status, "repositories request failed");
                return Err(RepoFetchError::Api {
                    status: response.status,
                });
            }

            let batch: Vec<RepoRecord> =
                serde_json::from_str(&response.body).map_err(|e| RepoFetchError::Decode {
                    page,
                    message: e.to_string(),
                })?;
            let count = batch.len();
            all.extend(batch);
            if count < PER_PAGE {
                break;
            }
            page += 1;
        }

        tracing::info!(org, repos = all.len(), pages = page, "repositories fetched");
        Ok(all)
    }
}
