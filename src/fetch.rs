use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::Config;
use crate::github::{self, DateRange};
use crate::model::{Issue, PullRequest};
use crate::snapshot;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("You must specify either --query or --input")]
    NoSource,
    #[error("--query and --input cannot be used together")]
    ConflictingSources,
}

/// Marks a failure of a live GitHub query, as opposed to a snapshot or usage
/// problem. Attached as context so the underlying cause is kept.
#[derive(Debug, Error)]
#[error("Failed to fetch from GitHub")]
pub struct FetchError;

/// Where a report's entities come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A live GitHub search.
    Query { query: String, range: DateRange },
    /// A snapshot written earlier by a `log` command.
    Snapshot(PathBuf),
}

impl Source {
    /// Pick the source from the mutually exclusive `--query` / `--input`
    /// options. The date range only applies to live queries.
    pub fn resolve(query: Option<String>, input: Option<PathBuf>, range: DateRange) -> Result<Self, SourceError> {
        match (query, input) {
            (Some(query), None) => Ok(Source::Query { query, range }),
            (None, Some(path)) => Ok(Source::Snapshot(path)),
            (Some(_), Some(_)) => Err(SourceError::ConflictingSources),
            (None, None) => Err(SourceError::NoSource),
        }
    }
}

/// Connection settings for live queries.
#[derive(Debug, Clone)]
pub struct GithubSettings {
    pub token: Option<String>,
    pub endpoint: String,
}

impl GithubSettings {
    /// Endpoint precedence: config file, then `GITHUB_ENDPOINT`, then the
    /// public API.
    pub fn resolve(config: &Config) -> Self {
        let endpoint = config
            .endpoint
            .clone()
            .or_else(github::endpoint_from_env)
            .unwrap_or_else(|| github::DEFAULT_ENDPOINT.to_string());
        Self {
            token: github::get_token_from_env(),
            endpoint,
        }
    }

    pub fn client(&self) -> Result<Octocrab> {
        github::create_client(self.token.as_deref(), &self.endpoint).context(FetchError)
    }
}

pub async fn load_pull_requests(
    source: &Source,
    settings: &GithubSettings,
    as_of: DateTime<Utc>,
) -> Result<Vec<PullRequest>> {
    match source {
        Source::Query { query, range } => {
            let client = settings.client()?;
            github::fetch_all_pull_requests(&client, query, range, as_of)
                .await
                .context(FetchError)
        }
        Source::Snapshot(path) => Ok(snapshot::load_pull_requests(path, as_of)?),
    }
}

pub async fn load_issues(source: &Source, settings: &GithubSettings) -> Result<Vec<Issue>> {
    match source {
        Source::Query { query, range } => {
            let client = settings.client()?;
            github::fetch_all_issues(&client, query, range)
                .await
                .context(FetchError)
        }
        Source::Snapshot(path) => Ok(snapshot::load_issues(path)?),
    }
}

/// Load both pull requests and issues. Live searches run concurrently; a
/// snapshot must be in the combined `{prs, issues}` form.
pub async fn load_all(
    source: &Source,
    settings: &GithubSettings,
    as_of: DateTime<Utc>,
) -> Result<(Vec<PullRequest>, Vec<Issue>)> {
    match source {
        Source::Query { query, range } => {
            let client = settings.client()?;
            tokio::try_join!(
                github::fetch_all_pull_requests(&client, query, range, as_of),
                github::fetch_all_issues(&client, query, range),
            )
            .context(FetchError)
        }
        Source::Snapshot(path) => Ok(snapshot::load_combined(path, as_of)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{IssueRecord, PullRequestRecord};
    use crate::snapshot::{save_snapshot, Snapshot, SnapshotError};
    use chrono::{Duration, TimeZone};
    use std::env;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 1, 0, 0, 0).unwrap()
    }

    fn offline_settings() -> GithubSettings {
        GithubSettings {
            token: None,
            endpoint: github::DEFAULT_ENDPOINT.to_string(),
        }
    }

    #[test]
    fn test_resolve_query() {
        let range = DateRange::default();
        let source = Source::resolve(Some("repo:o/r".to_string()), None, range).unwrap();
        assert_eq!(
            source,
            Source::Query {
                query: "repo:o/r".to_string(),
                range
            }
        );
    }

    #[test]
    fn test_resolve_snapshot() {
        let source = Source::resolve(None, Some(PathBuf::from("log.json")), DateRange::default()).unwrap();
        assert_eq!(source, Source::Snapshot(PathBuf::from("log.json")));
    }

    #[test]
    fn test_resolve_requires_a_source() {
        assert_eq!(
            Source::resolve(None, None, DateRange::default()),
            Err(SourceError::NoSource)
        );
        assert_eq!(
            SourceError::NoSource.to_string(),
            "You must specify either --query or --input"
        );
    }

    #[test]
    fn test_resolve_rejects_both_sources() {
        let result = Source::resolve(
            Some("q".to_string()),
            Some(PathBuf::from("log.json")),
            DateRange::default(),
        );
        assert_eq!(result, Err(SourceError::ConflictingSources));
    }

    #[test]
    fn test_fetch_error_is_kept_as_context() {
        let error = Err::<(), _>(anyhow::anyhow!("GitHub API error: boom"))
            .context(FetchError)
            .unwrap_err();

        assert!(error.downcast_ref::<FetchError>().is_some());
        assert_eq!(
            format!("{:#}", error),
            "Failed to fetch from GitHub: GitHub API error: boom"
        );
    }

    #[test]
    fn test_endpoint_prefers_config() {
        let config = Config {
            endpoint: Some("https://ghe.example.com/api".to_string()),
            ..Config::default()
        };
        assert_eq!(GithubSettings::resolve(&config).endpoint, "https://ghe.example.com/api");
    }

    #[tokio::test]
    async fn test_load_all_from_combined_snapshot() {
        let temp_path = env::temp_dir().join("gh_analytics_test_fetch_combined.json");
        let _ = std::fs::remove_file(&temp_path);

        let prs = vec![PullRequest::new(
            PullRequestRecord {
                title: "Fix typo".to_string(),
                author: Some("alice".to_string()),
                url: "https://github.com/owner/repo/pull/11".to_string(),
                created_at: t0(),
                merged_at: Some(t0() + Duration::minutes(10)),
                additions: 1,
                deletions: 1,
                authored_date: t0(),
                reviews: vec![],
            },
            t0(),
        )];
        let issues = vec![Issue::new(IssueRecord {
            title: "Question".to_string(),
            author: Some("bob".to_string()),
            url: "https://github.com/owner/repo/issues/12".to_string(),
            created_at: t0(),
            closed_at: None,
            comments: vec![],
        })];
        save_snapshot(&temp_path, &Snapshot { prs: &prs, issues: &issues }).unwrap();

        let source = Source::Snapshot(temp_path.clone());
        let (loaded_prs, loaded_issues) = load_all(&source, &offline_settings(), t0()).await.unwrap();
        assert_eq!(loaded_prs, prs);
        assert_eq!(loaded_issues, issues);

        let only_issues = load_issues(&source, &offline_settings()).await.unwrap();
        assert_eq!(only_issues, issues);

        let _ = std::fs::remove_file(&temp_path);
    }

    #[tokio::test]
    async fn test_snapshot_errors_stay_downcastable() {
        let temp_path = env::temp_dir().join("gh_analytics_test_fetch_bad.json");
        std::fs::write(&temp_path, "[{\"title\": 1}]").unwrap();

        let source = Source::Snapshot(temp_path.clone());
        let err = load_pull_requests(&source, &offline_settings(), t0()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SnapshotError>(),
            Some(SnapshotError::MalformedRecord { .. })
        ));

        let _ = std::fs::remove_file(&temp_path);
    }
}
