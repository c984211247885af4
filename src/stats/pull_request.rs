use serde::Serialize;

use super::aggregate::{seconds_to_millis, Aggregate};
use crate::filter::{is_team_member, without_bots};
use crate::model::{seconds_between, PullRequest};
use crate::output::RenderMode;

/// Numeric pull request metrics, before rendering. Durations are in seconds.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PullRequestSummary {
    pub pull_request_count: usize,
    pub external_pull_request_count: usize,
    pub additions: Aggregate,
    pub deletions: Aggregate,
    pub lead_time: Aggregate,
    pub time_to_merge: Aggregate,
    pub time_to_merge_from_first_review: Aggregate,
    pub response_time: Aggregate,
}

/// Rendered pull request section of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestStats {
    pub pull_request_count: String,
    pub external_pull_request_count: String,
    pub additions_average: String,
    pub additions_median: String,
    pub deletions_average: String,
    pub deletions_median: String,
    pub lead_time_average: String,
    pub lead_time_median: String,
    pub time_to_merge_average: String,
    pub time_to_merge_median: String,
    pub time_to_merge_from_first_review_average: String,
    pub time_to_merge_from_first_review_median: String,
    pub response_time_average: String,
    pub response_time_median: String,
}

/// Compute pull request metrics.
///
/// Bot-authored PRs are dropped first. Lead time and time to merge only
/// consider merged PRs; counts and line statistics consider all of them.
/// Review based durations use the first review written by a team member,
/// and PRs without one are left out of those aggregates.
pub fn summarize_pull_requests(prs: &[PullRequest], team_members: &[String]) -> PullRequestSummary {
    let total = prs.len();
    let prs = without_bots(prs);
    tracing::debug!(total, kept = prs.len(), "Dropped bot-authored pull requests");
    let is_team = |author: Option<&str>| is_team_member(team_members, author);

    let external_pull_request_count = prs.iter().filter(|pr| !is_team(pr.author())).count();
    let merged: Vec<&PullRequest> = prs.iter().copied().filter(|pr| pr.is_merged()).collect();

    let additions: Vec<f64> = prs.iter().map(|pr| pr.additions() as f64).collect();
    let deletions: Vec<f64> = prs.iter().map(|pr| pr.deletions() as f64).collect();
    let lead_times: Vec<i64> = merged.iter().map(|pr| pr.lead_time_seconds()).collect();
    let times_to_merge: Vec<i64> = merged.iter().map(|pr| pr.time_to_merge_seconds()).collect();

    let times_from_first_review: Vec<i64> = merged
        .iter()
        .filter_map(|pr| {
            let review = pr.first_review_by(is_team)?;
            let merged_at = pr.merged_at()?;
            Some(seconds_between(review.created_at, merged_at))
        })
        .collect();

    let response_times: Vec<i64> = prs
        .iter()
        .filter_map(|pr| {
            pr.first_review_by(is_team)
                .map(|review| seconds_between(pr.created_at(), review.created_at))
        })
        .collect();

    PullRequestSummary {
        pull_request_count: prs.len(),
        external_pull_request_count,
        additions: Aggregate::of(&additions),
        deletions: Aggregate::of(&deletions),
        lead_time: Aggregate::of_seconds(&lead_times),
        time_to_merge: Aggregate::of_seconds(&times_to_merge),
        time_to_merge_from_first_review: Aggregate::of_seconds(&times_from_first_review),
        response_time: Aggregate::of_seconds(&response_times),
    }
}

impl PullRequestSummary {
    pub fn render(&self, mode: RenderMode) -> PullRequestStats {
        let lines = |value: f64| mode.count(value.round() as i64, "lines");
        let duration = |seconds: f64| mode.duration(seconds_to_millis(seconds));

        PullRequestStats {
            pull_request_count: mode.count(self.pull_request_count as i64, "pull requests"),
            external_pull_request_count: mode
                .count(self.external_pull_request_count as i64, "pull requests"),
            additions_average: lines(self.additions.average),
            additions_median: lines(self.additions.median),
            deletions_average: lines(self.deletions.average),
            deletions_median: lines(self.deletions.median),
            lead_time_average: duration(self.lead_time.average),
            lead_time_median: duration(self.lead_time.median),
            time_to_merge_average: duration(self.time_to_merge.average),
            time_to_merge_median: duration(self.time_to_merge.median),
            time_to_merge_from_first_review_average: duration(
                self.time_to_merge_from_first_review.average,
            ),
            time_to_merge_from_first_review_median: duration(
                self.time_to_merge_from_first_review.median,
            ),
            response_time_average: duration(self.response_time.average),
            response_time_median: duration(self.response_time.median),
        }
    }
}

/// Summarize and render in one step.
pub fn pull_request_stats(
    prs: &[PullRequest],
    team_members: &[String],
    mode: RenderMode,
) -> PullRequestStats {
    summarize_pull_requests(prs, team_members).render(mode)
}
