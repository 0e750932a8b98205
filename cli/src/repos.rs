//! `langtree repos`: fetch an organization's repositories and render them.

use langtree::{OrgRepoClient, RepoFetchError, RepoRecord};
use unicode_width::UnicodeWidthStr;

/// Printed instead of an empty table.
pub const NO_REPOSITORIES: &str = "No repositories found.";

const HEADERS: [&str; 7] = [
    "Name",
    "Language",
    "Stars",
    "Forks",
    "Open issues",
    "Archived",
    "Last push",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReposFormat {
    Table,
    Json { pretty: bool },
}

fn row(repo: &RepoRecord) -> [String; 7] {
    [
        repo.name.clone(),
        repo.language.clone().unwrap_or_default(),
        repo.stargazers_count.to_string(),
        repo.forks_count.to_string(),
        repo.open_issues_count.to_string(),
        repo.archived_label().to_string(),
        repo.last_push_date(),
    ]
}

/// Left-aligned table with a header row; column widths follow display width.
pub fn render_table(repos: &[RepoRecord]) -> String {
    if repos.is_empty() {
        return NO_REPOSITORIES.to_string();
    }
    let rows: Vec<[String; 7]> = repos.iter().map(row).collect();
    let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.width()).collect();
    for r in &rows {
        for (w, cell) in widths.iter_mut().zip(r.iter()) {
            *w = (*w).max(cell.width());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &widths, HEADERS.iter().copied());
    for r in &rows {
        push_line(&mut out, &widths, r.iter().map(String::as_str));
    }
    out.truncate(out.trim_end().len());
    out
}

fn push_line<'a>(out: &mut String, widths: &[usize], cells: impl Iterator<Item = &'a str>) {
    let mut line = String::new();
    for (i, cell) in cells.enumerate() {
        if i > 0 {
            line.push_str("  ");
        }
        line.push_str(cell);
        line.push_str(&" ".repeat(widths[i].saturating_sub(cell.width())));
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

pub fn render_json(repos: &[RepoRecord], pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(repos)
    } else {
        serde_json::to_string(repos)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReposCommandError {
    #[error("{}", .0.user_message())]
    Fetch(#[from] RepoFetchError),
    #[error("encode json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fetches every page for `org` and renders it. An empty list renders as
/// [`NO_REPOSITORIES`] in table form and `[]` as JSON.
pub async fn run_repos(
    client: &OrgRepoClient,
    org: &str,
    format: ReposFormat,
) -> Result<String, ReposCommandError> {
    let repos = client.fetch_org_repos(org).await?;
    tracing::debug!(org = org.trim(), count = repos.len(), "repositories fetched");
    match format {
        ReposFormat::Table => Ok(render_table(&repos)),
        ReposFormat::Json { pretty } => Ok(render_json(&repos, pretty)?),
    }
}
