use chrono::{DateTime, Utc};
use serde::Serialize;

use super::aggregate::{seconds_to_millis, Aggregate};
use crate::filter::{is_team_member, without_bots};
use crate::model::{seconds_between, Issue};
use crate::output::RenderMode;

/// Numeric issue metrics, before rendering. Durations are in seconds.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IssueSummary {
    pub issue_count: usize,
    pub external_issue_count: usize,
    pub external_issue_closed_count: usize,
    pub response_time: Aggregate,
    pub time_to_close: Aggregate,
}

/// Rendered issue section of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueStats {
    pub issue_count: String,
    pub external_issue_count: String,
    pub external_issue_closed_count: String,
    pub response_time_average: String,
    pub response_time_median: String,
    pub time_to_close_average: String,
    pub time_to_close_median: String,
}

/// Seconds an issue waited for its first team comment. Without one, the
/// exposure so far: until closure, or until `as_of` while still open.
fn response_seconds(issue: &Issue, team_members: &[String], as_of: DateTime<Utc>) -> i64 {
    let responded_at = issue
        .first_comment_by(|author| is_team_member(team_members, author))
        .map(|comment| comment.created_at)
        .unwrap_or_else(|| issue.closed_at().unwrap_or(as_of));
    seconds_between(issue.created_at(), responded_at)
}

/// Compute issue metrics as of `as_of`.
///
/// Bot-authored issues are dropped first. External counts cover issues not
/// authored by a team member; duration aggregates cover every remaining
/// issue, with time to close limited to closed ones.
pub fn summarize_issues(issues: &[Issue], team_members: &[String], as_of: DateTime<Utc>) -> IssueSummary {
    let total = issues.len();
    let issues = without_bots(issues);
    tracing::debug!(total, kept = issues.len(), "Dropped bot-authored issues");

    let external: Vec<&Issue> = issues
        .iter()
        .copied()
        .filter(|issue| !is_team_member(team_members, issue.author()))
        .collect();
    let external_issue_closed_count = external.iter().filter(|issue| issue.is_closed()).count();

    let response_times: Vec<i64> = issues
        .iter()
        .map(|issue| response_seconds(issue, team_members, as_of))
        .collect();
    let close_times: Vec<i64> = issues
        .iter()
        .filter_map(|issue| {
            issue
                .closed_at()
                .map(|closed_at| seconds_between(issue.created_at(), closed_at))
        })
        .collect();

    IssueSummary {
        issue_count: issues.len(),
        external_issue_count: external.len(),
        external_issue_closed_count,
        response_time: Aggregate::of_seconds(&response_times),
        time_to_close: Aggregate::of_seconds(&close_times),
    }
}

impl IssueSummary {
    pub fn render(&self, mode: RenderMode) -> IssueStats {
        let issues = |count: usize| mode.count(count as i64, "issues");
        let duration = |seconds: f64| mode.duration(seconds_to_millis(seconds));

        IssueStats {
            issue_count: issues(self.issue_count),
            external_issue_count: issues(self.external_issue_count),
            external_issue_closed_count: issues(self.external_issue_closed_count),
            response_time_average: duration(self.response_time.average),
            response_time_median: duration(self.response_time.median),
            time_to_close_average: duration(self.time_to_close.average),
            time_to_close_median: duration(self.time_to_close.median),
        }
    }
}

/// Summarize and render in one step.
pub fn issue_stats(
    issues: &[Issue],
    team_members: &[String],
    as_of: DateTime<Utc>,
    mode: RenderMode,
) -> IssueStats {
    summarize_issues(issues, team_members, as_of).render(mode)
}
