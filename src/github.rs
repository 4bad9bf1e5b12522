use crate::config::GitHubSettings;
use crate::error::{AppError, AppResult};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

const SERVICE: &str = "GitHub";
const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// The two branch references being compared, plus the repository they live in.
#[derive(Debug, Clone)]
pub struct CompareRequest {
    pub owner: String,
    pub repo: String,
    pub base: String,
    pub head: String,
}

impl CompareRequest {
    /// `base...head`, as used in the compare resource path.
    pub fn range(&self) -> String {
        format!("{}...{}", self.base, self.head)
    }
}

/// Parsed body of a branch comparison. Only `files` feeds the change log.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeSet {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub ahead_by: Option<u64>,
    #[serde(default)]
    pub behind_by: Option<u64>,
    #[serde(default)]
    pub total_commits: Option<u64>,
    #[serde(default)]
    pub files: Vec<FileChange>,
}

/// One file's delta within the comparison.
#[derive(Debug, Clone, Deserialize)]
pub struct FileChange {
    pub filename: String,
    pub additions: u64,
    pub deletions: u64,
    pub changes: u64,
    pub status: FileStatus,
    /// Missing for binary files and for diffs GitHub declines to render.
    #[serde(default)]
    pub patch: Option<String>,
}

/// Per-file status as reported by GitHub. Unknown values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum FileStatus {
    Added,
    Removed,
    Modified,
    Renamed,
    Copied,
    Changed,
    Unchanged,
    Other(String),
}

impl FileStatus {
    pub fn as_str(&self) -> &str {
        match self {
            FileStatus::Added => "added",
            FileStatus::Removed => "removed",
            FileStatus::Modified => "modified",
            FileStatus::Renamed => "renamed",
            FileStatus::Copied => "copied",
            FileStatus::Changed => "changed",
            FileStatus::Unchanged => "unchanged",
            FileStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for FileStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "added" => FileStatus::Added,
            "removed" => FileStatus::Removed,
            "modified" => FileStatus::Modified,
            "renamed" => FileStatus::Renamed,
            "copied" => FileStatus::Copied,
            "changed" => FileStatus::Changed,
            "unchanged" => FileStatus::Unchanged,
            _ => FileStatus::Other(raw),
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything that can produce the change set between two branches.
pub trait CompareSource: Send + Sync {
    fn compare(&self, request: &CompareRequest) -> AppResult<ChangeSet>;
}

/// REST client for the GitHub compare endpoint.
pub struct GitHubClient {
    client: Client,
    token: String,
    api_base_url: String,
}

impl GitHubClient {
    pub fn new(settings: &GitHubSettings) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(90))
            .user_agent(concat!("prdesc/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| AppError::Transport {
                service: SERVICE,
                source,
            })?;

        Ok(GitHubClient {
            client,
            token: settings.token.clone(),
            api_base_url: settings.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn compare_url(&self, request: &CompareRequest) -> String {
        format!(
            "{}/repos/{}/{}/compare/{}",
            self.api_base_url,
            request.owner,
            request.repo,
            request.range()
        )
    }
}

impl CompareSource for GitHubClient {
    fn compare(&self, request: &CompareRequest) -> AppResult<ChangeSet> {
        let url = self.compare_url(request);

        log::info!("Fetching comparison {}", url);

        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .header(ACCEPT, GITHUB_ACCEPT)
            .send()
            .map_err(|source| AppError::Transport {
                service: SERVICE,
                source,
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            return Err(AppError::Fetch {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().map_err(|source| AppError::Transport {
            service: SERVICE,
            source,
        })?;
        parse_change_set(&body)
    }
}

pub fn parse_change_set(body: &str) -> AppResult<ChangeSet> {
    serde_json::from_str(body).map_err(|e| AppError::MalformedResponse {
        service: SERVICE,
        reason: e.to_string(),
    })
}
