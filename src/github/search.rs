use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use futures::stream::{self, TryStreamExt};
use octocrab::Octocrab;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio_retry::{strategy::ExponentialBackoff, Retry};

use crate::github::types::{GraphqlResponse, IssueNode, PullRequestNode, SearchConnection, SearchData};
use crate::model::{Issue, PullRequest};

const PULL_REQUEST_SEARCH: &str = r#"
query paginate($cursor: String, $searchQuery: String!) {
  search(type: ISSUE, first: 100, query: $searchQuery, after: $cursor) {
    issueCount
    nodes {
      ... on PullRequest {
        title
        author { login }
        url
        createdAt
        mergedAt
        additions
        deletions
        commits(first: 1) { nodes { commit { authoredDate } } }
        reviews(first: 50) { nodes { author { login } createdAt } }
      }
    }
    pageInfo { endCursor hasNextPage }
  }
  rateLimit { limit cost remaining resetAt }
}
"#;

const ISSUE_SEARCH: &str = r#"
query paginate($cursor: String, $searchQuery: String!) {
  search(type: ISSUE, first: 100, query: $searchQuery, after: $cursor) {
    issueCount
    nodes {
      ... on Issue {
        title
        author { login }
        url
        createdAt
        closedAt
        comments(first: 50) { nodes { author { login } createdAt } }
      }
    }
    pageInfo { endCursor hasNextPage }
  }
  rateLimit { limit cost remaining resetAt }
}
"#;

/// Inclusive range of creation dates to restrict a search to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// The `created:` qualifier for this range, or `None` when unbounded.
    /// An open side is written as `*`.
    pub fn qualifier(&self) -> Option<String> {
        if self.start.is_none() && self.end.is_none() {
            return None;
        }
        let bound = |date: Option<NaiveDate>| {
            date.map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "*".to_string())
        };
        Some(format!("created:{}..{}", bound(self.start), bound(self.end)))
    }
}

/// Build the full search string, e.g. `is:pr repo:owner/repo created:2024-01-01..*`.
pub fn build_search_query(type_qualifier: &str, query: &str, range: &DateRange) -> String {
    let mut search = format!("{} {}", type_qualifier, query.trim());
    if let Some(created) = range.qualifier() {
        search.push(' ');
        search.push_str(&created);
    }
    search
}

/// Map an octocrab error to a message a user can act on.
fn describe_api_error(e: octocrab::Error) -> anyhow::Error {
    let error_str = format!("{:?}", e);
    if error_str.contains("401") || error_str.contains("Bad credentials") {
        anyhow!("Authentication failed. Set GITHUB_TOKEN to a valid token.")
    } else if error_str.contains("rate limit") || error_str.contains("403") {
        anyhow!("GitHub API rate limit exceeded. Wait a few minutes and try again.")
    } else {
        anyhow!("GitHub API error: {}", e)
    }
}

/// Fetch one page of search results, retrying transient failures.
async fn fetch_page(
    client: &Octocrab,
    document: &str,
    search_query: &str,
    cursor: Option<&str>,
) -> Result<SearchConnection> {
    // Retry strategy: exponential backoff with 3 attempts
    let retry_strategy = ExponentialBackoff::from_millis(100)
        .max_delay(std::time::Duration::from_secs(5))
        .take(3);

    let payload = json!({
        "query": document,
        "variables": { "searchQuery": search_query, "cursor": cursor },
    });

    let raw: Value = Retry::start(retry_strategy, || async {
        client
            .graphql::<Value>(&payload)
            .await
            .map_err(describe_api_error)
    })
    .await?;

    let response: GraphqlResponse<SearchData> =
        serde_json::from_value(raw).context("Unexpected GraphQL search response")?;

    if !response.errors.is_empty() {
        let messages: Vec<&str> = response.errors.iter().map(|e| e.message.as_str()).collect();
        bail!("GitHub GraphQL error: {}", messages.join("; "));
    }
    let data = response
        .data
        .context("GitHub GraphQL response contained no data")?;

    if let Some(rate) = &data.rate_limit {
        tracing::debug!(
            cost = rate.cost,
            remaining = rate.remaining,
            limit = rate.limit,
            reset_at = %rate.reset_at,
            "GraphQL rate limit"
        );
    }
    tracing::debug!(
        nodes = data.search.nodes.len(),
        total = data.search.issue_count,
        has_next_page = data.search.page_info.has_next_page,
        "Fetched search page"
    );

    Ok(data.search)
}

/// Decode the nodes of a page, skipping the empty objects GitHub returns for
/// results outside the query's type condition.
fn decode_nodes<T: DeserializeOwned>(nodes: Vec<Value>) -> Result<Vec<T>> {
    nodes
        .into_iter()
        .filter(|node| node.as_object().is_some_and(|fields| !fields.is_empty()))
        .map(|node| serde_json::from_value(node).context("Malformed search result"))
        .collect()
}

/// Walk every page of a search, following `endCursor` until `hasNextPage`
/// is false.
async fn fetch_all_nodes<T: DeserializeOwned>(
    client: &Octocrab,
    document: &str,
    search_query: &str,
) -> Result<Vec<T>> {
    tracing::info!(query = search_query, "Searching GitHub");

    // State: Some(cursor) while another page is due, None once exhausted.
    let pages = stream::try_unfold(Some(None::<String>), move |state| async move {
        let Some(cursor) = state else {
            return Ok(None);
        };
        let page = fetch_page(client, document, search_query, cursor.as_deref()).await?;
        let next = page.page_info.has_next_page.then_some(page.page_info.end_cursor);
        let nodes = decode_nodes::<T>(page.nodes)?;
        Ok::<_, anyhow::Error>(Some((nodes, next)))
    });

    pages.try_concat().await
}

/// Fetch every pull request matching `query` within `range`.
pub async fn fetch_all_pull_requests(
    client: &Octocrab,
    query: &str,
    range: &DateRange,
    as_of: DateTime<Utc>,
) -> Result<Vec<PullRequest>> {
    let search_query = build_search_query("is:pr", query, range);
    let nodes: Vec<PullRequestNode> = fetch_all_nodes(client, PULL_REQUEST_SEARCH, &search_query)
        .await
        .with_context(|| format!("Pull request search failed: {}", search_query))?;

    tracing::info!(count = nodes.len(), "Fetched pull requests");
    Ok(nodes
        .into_iter()
        .map(|node| PullRequest::new(node.into_record(), as_of))
        .collect())
}

/// Fetch every issue matching `query` within `range`.
pub async fn fetch_all_issues(client: &Octocrab, query: &str, range: &DateRange) -> Result<Vec<Issue>> {
    let search_query = build_search_query("is:issue", query, range);
    let nodes: Vec<IssueNode> = fetch_all_nodes(client, ISSUE_SEARCH, &search_query)
        .await
        .with_context(|| format!("Issue search failed: {}", search_query))?;

    tracing::info!(count = nodes.len(), "Fetched issues");
    Ok(nodes
        .into_iter()
        .map(|node| Issue::new(node.into_record()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_query_without_range() {
        let query = build_search_query("is:pr", " repo:owner/repo ", &DateRange::default());
        assert_eq!(query, "is:pr repo:owner/repo");
    }

    #[test]
    fn test_query_with_full_range() {
        let range = DateRange::new(Some(date(2024, 1, 1)), Some(date(2024, 1, 31)));
        let query = build_search_query("is:issue", "org:acme", &range);
        assert_eq!(query, "is:issue org:acme created:2024-01-01..2024-01-31");
    }

    #[test]
    fn test_query_with_open_ended_range() {
        let start_only = DateRange::new(Some(date(2024, 3, 5)), None);
        assert_eq!(start_only.qualifier().as_deref(), Some("created:2024-03-05..*"));

        let end_only = DateRange::new(None, Some(date(2024, 3, 5)));
        assert_eq!(end_only.qualifier().as_deref(), Some("created:*..2024-03-05"));
    }

    #[test]
    fn test_decode_nodes_skips_empty_objects() {
        let nodes = vec![
            json!({}),
            json!({
                "title": "t",
                "author": {"login": "a"},
                "url": "u",
                "createdAt": "2024-01-01T00:00:00Z",
                "mergedAt": null,
                "additions": 1,
                "deletions": 2,
                "commits": {"nodes": []},
                "reviews": {"nodes": []}
            }),
        ];
        let decoded: Vec<PullRequestNode> = decode_nodes(nodes).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].title, "t");
    }

    #[test]
    fn test_decode_nodes_rejects_malformed() {
        let nodes = vec![json!({"title": "missing everything else"})];
        assert!(decode_nodes::<PullRequestNode>(nodes).is_err());
    }
}
