pub mod issue;
pub mod pull_request;

pub use issue::{Issue, IssueRecord};
pub use pull_request::{PullRequest, PullRequestRecord};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A timestamped contribution to a pull request or issue: a submitted review
/// on a PR, or a comment on an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub author: Option<String>,
}

impl Activity {
    pub fn new(created_at: DateTime<Utc>, author: Option<&str>) -> Self {
        Self {
            created_at,
            author: author.map(str::to_string),
        }
    }
}

/// Whole seconds elapsed from `from` to `to`, truncated toward zero.
pub fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_seconds()
}
