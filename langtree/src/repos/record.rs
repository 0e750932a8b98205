//! One repository row as returned by `GET /orgs/{org}/repos`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Repository fields shown in the grid. Unknown API fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRecord {
    pub name: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub open_issues_count: u64,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub html_url: Option<String>,
}

impl RepoRecord {
    /// Last push as `YYYY-MM-DD`, empty when the repository was never pushed.
    pub fn last_push_date(&self) -> String {
        self.pushed_at
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }

    pub fn archived_label(&self) -> &'static str {
        if self.archived {
            "Yes"
        } else {
            "No"
        }
    }
}
