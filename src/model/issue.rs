use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Activity;

/// Raw attributes of an issue, as fetched or as persisted in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRecord {
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    pub url: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    /// Comments in the order the source returned them.
    pub comments: Vec<Activity>,
}

/// An issue or discussion thread.
///
/// Unlike [`PullRequest`](super::PullRequest) nothing is precomputed: which
/// comment counts as the response depends on the team allowlist, which is
/// only known when a report is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Issue {
    record: IssueRecord,
}

impl Issue {
    pub fn new(record: IssueRecord) -> Self {
        Self { record }
    }

    pub fn title(&self) -> &str {
        &self.record.title
    }

    pub fn author(&self) -> Option<&str> {
        self.record.author.as_deref()
    }

    pub fn url(&self) -> &str {
        &self.record.url
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.record.created_at
    }

    pub fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.record.closed_at
    }

    pub fn is_closed(&self) -> bool {
        self.record.closed_at.is_some()
    }

    pub fn comments(&self) -> &[Activity] {
        &self.record.comments
    }

    /// First comment (in source order) whose author satisfies `predicate`.
    pub fn first_comment_by<F>(&self, predicate: F) -> Option<&Activity>
    where
        F: Fn(Option<&str>) -> bool,
    {
        self.record
            .comments
            .iter()
            .find(|comment| predicate(comment.author.as_deref()))
    }

    pub fn record(&self) -> &IssueRecord {
        &self.record
    }
}
