//! GraphQL response shapes for the search queries in `search.rs`.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::model::{Activity, IssueRecord, PullRequestRecord};

#[derive(Debug, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchData {
    pub search: SearchConnection,
    pub rate_limit: Option<RateLimit>,
}

/// One page of search results. Nodes are kept untyped because results that
/// do not match the query's type condition come back as empty objects.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConnection {
    pub issue_count: Option<u64>,
    #[serde(default)]
    pub nodes: Vec<serde_json::Value>,
    pub page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimit {
    pub limit: u64,
    pub cost: u64,
    pub remaining: u64,
    pub reset_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct Actor {
    pub login: String,
}

/// A GraphQL connection; entries may be null when access is restricted.
#[derive(Debug, Deserialize)]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<Option<T>>,
}

impl<T> Connection<T> {
    fn into_nodes(self) -> impl Iterator<Item = T> {
        self.nodes.into_iter().flatten()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityNode {
    pub author: Option<Actor>,
    pub created_at: DateTime<Utc>,
}

impl From<ActivityNode> for Activity {
    fn from(node: ActivityNode) -> Self {
        Activity {
            created_at: node.created_at,
            author: node.author.map(|a| a.login),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CommitNode {
    pub commit: Commit,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub authored_date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestNode {
    pub title: String,
    pub author: Option<Actor>,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
    pub additions: u64,
    pub deletions: u64,
    pub commits: Connection<CommitNode>,
    pub reviews: Connection<ActivityNode>,
}

impl PullRequestNode {
    pub fn into_record(self) -> PullRequestRecord {
        // A PR whose branch lost all commits falls back to its creation time.
        let authored_date = self
            .commits
            .into_nodes()
            .next()
            .map(|node| node.commit.authored_date)
            .unwrap_or(self.created_at);

        PullRequestRecord {
            title: self.title,
            author: self.author.map(|a| a.login),
            url: self.url,
            created_at: self.created_at,
            merged_at: self.merged_at,
            additions: self.additions,
            deletions: self.deletions,
            authored_date,
            reviews: self.reviews.into_nodes().map(Activity::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueNode {
    pub title: String,
    pub author: Option<Actor>,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub comments: Connection<ActivityNode>,
}

impl IssueNode {
    pub fn into_record(self) -> IssueRecord {
        IssueRecord {
            title: self.title,
            author: self.author.map(|a| a.login),
            url: self.url,
            created_at: self.created_at,
            closed_at: self.closed_at,
            comments: self.comments.into_nodes().map(Activity::from).collect(),
        }
    }
}
