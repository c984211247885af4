use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{seconds_between, Activity};

/// Raw attributes of a pull request, as fetched or as persisted in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestRecord {
    pub title: String,
    /// Absent when the author account was deleted or is an app.
    #[serde(default)]
    pub author: Option<String>,
    pub url: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
    pub additions: u64,
    pub deletions: u64,
    /// Authored date of the first commit.
    pub authored_date: DateTime<Utc>,
    /// Submitted reviews in the order the source returned them.
    pub reviews: Vec<Activity>,
}

/// A pull request with its durations computed once, at construction.
///
/// Durations of an unmerged PR are measured against the `as_of` instant given
/// to [`PullRequest::new`], so they are a live estimate rather than a fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    #[serde(flatten)]
    record: PullRequestRecord,
    lead_time_seconds: i64,
    time_to_merge_seconds: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_time_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_to_merge_from_first_review_seconds: Option<i64>,
}

impl PullRequest {
    pub fn new(record: PullRequestRecord, as_of: DateTime<Utc>) -> Self {
        let merged_or_now = record.merged_at.unwrap_or(as_of);
        let first_review = record.reviews.first().map(|r| r.created_at);

        Self {
            lead_time_seconds: seconds_between(record.authored_date, merged_or_now),
            time_to_merge_seconds: seconds_between(record.created_at, merged_or_now),
            response_time_seconds: first_review.map(|at| seconds_between(record.created_at, at)),
            time_to_merge_from_first_review_seconds: first_review
                .map(|at| seconds_between(at, merged_or_now)),
            record,
        }
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

    pub fn merged_at(&self) -> Option<DateTime<Utc>> {
        self.record.merged_at
    }

    pub fn is_merged(&self) -> bool {
        self.record.merged_at.is_some()
    }

    pub fn additions(&self) -> u64 {
        self.record.additions
    }

    pub fn deletions(&self) -> u64 {
        self.record.deletions
    }

    pub fn authored_date(&self) -> DateTime<Utc> {
        self.record.authored_date
    }

    pub fn reviews(&self) -> &[Activity] {
        &self.record.reviews
    }

    /// First review (in source order) whose author satisfies `predicate`.
    pub fn first_review_by<F>(&self, predicate: F) -> Option<&Activity>
    where
        F: Fn(Option<&str>) -> bool,
    {
        self.record
            .reviews
            .iter()
            .find(|review| predicate(review.author.as_deref()))
    }

    pub fn record(&self) -> &PullRequestRecord {
        &self.record
    }

    /// Seconds from the first commit to merge (or `as_of` when unmerged).
    pub fn lead_time_seconds(&self) -> i64 {
        self.lead_time_seconds
    }

    /// Seconds from creation to merge (or `as_of` when unmerged).
    pub fn time_to_merge_seconds(&self) -> i64 {
        self.time_to_merge_seconds
    }

    /// Seconds from creation to the first review; `None` without reviews.
    pub fn response_time_seconds(&self) -> Option<i64> {
        self.response_time_seconds
    }

    /// Seconds from the first review to merge (or `as_of`); `None` without reviews.
    pub fn time_to_merge_from_first_review_seconds(&self) -> Option<i64> {
        self.time_to_merge_from_first_review_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn record(merged_at: Option<DateTime<Utc>>, reviews: Vec<Activity>) -> PullRequestRecord {
        PullRequestRecord {
            title: "Add retry to uploader".to_string(),
            author: Some("alice".to_string()),
            url: "https://github.com/owner/repo/pull/7".to_string(),
            created_at: created(),
            merged_at,
            additions: 120,
            deletions: 30,
            authored_date: created(),
            reviews,
        }
    }

    #[test]
    fn test_merged_durations() {
        let merged = created() + Duration::seconds(10);
        let pr = PullRequest::new(record(Some(merged), vec![]), created() + Duration::days(30));

        assert_eq!(pr.time_to_merge_seconds(), 10);
        assert_eq!(pr.lead_time_seconds(), 10);
        assert!(pr.is_merged());
    }

    #[test]
    fn test_lead_time_counts_from_first_commit() {
        let mut rec = record(Some(created() + Duration::hours(1)), vec![]);
        rec.authored_date = created() - Duration::hours(2);
        let pr = PullRequest::new(rec, created());

        assert_eq!(pr.lead_time_seconds(), 3 * 3600);
        assert_eq!(pr.time_to_merge_seconds(), 3600);
    }

    #[test]
    fn test_no_reviews_leaves_review_durations_absent() {
        let pr = PullRequest::new(record(Some(created() + Duration::seconds(5)), vec![]), created());

        assert!(pr.response_time_seconds().is_none());
        assert!(pr.time_to_merge_from_first_review_seconds().is_none());
    }

    #[test]
    fn test_unmerged_measures_against_as_of() {
        let as_of = created() + Duration::minutes(15);
        let pr = PullRequest::new(record(None, vec![]), as_of);

        assert!(!pr.is_merged());
        assert_eq!(pr.time_to_merge_seconds(), 900);
        assert_eq!(pr.lead_time_seconds(), 900);
    }

    #[test]
    fn test_review_durations_use_first_review_in_source_order() {
        let reviews = vec![
            Activity::new(created() + Duration::seconds(60), Some("bob")),
            Activity::new(created() + Duration::seconds(30), Some("carol")),
        ];
        let merged = created() + Duration::seconds(100);
        let pr = PullRequest::new(record(Some(merged), reviews), created());

        assert_eq!(pr.response_time_seconds(), Some(60));
        assert_eq!(pr.time_to_merge_from_first_review_seconds(), Some(40));
    }

    #[test]
    fn test_first_review_by_predicate() {
        let reviews = vec![
            Activity::new(created() + Duration::seconds(10), None),
            Activity::new(created() + Duration::seconds(20), Some("bob")),
        ];
        let pr = PullRequest::new(record(None, reviews), created());

        let review = pr.first_review_by(|author| author.is_some()).unwrap();
        assert_eq!(review.author.as_deref(), Some("bob"));
        assert!(pr.first_review_by(|author| author == Some("zed")).is_none());
    }

    #[test]
    fn test_serializes_raw_and_derived_fields() {
        let merged = created() + Duration::seconds(10);
        let pr = PullRequest::new(record(Some(merged), vec![]), created());
        let value = serde_json::to_value(&pr).unwrap();

        assert_eq!(value["title"], "Add retry to uploader");
        assert_eq!(value["mergedAt"], "2024-03-01T09:00:10Z");
        assert_eq!(value["leadTimeSeconds"], 10);
        assert_eq!(value["timeToMergeSeconds"], 10);
        assert!(value.get("responseTimeSeconds").is_none());
    }
}
