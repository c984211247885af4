use chrono::{DateTime, Utc};
use serde::Serialize;

use super::issues::{summarize_issues, IssueStats};
use super::pull_request::{summarize_pull_requests, PullRequestStats};
use crate::model::{Issue, PullRequest};
use crate::output::RenderMode;

/// Inputs shared by every section of one report.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Normalized team allowlist; empty disables team filtering.
    pub team_members: Vec<String>,
    pub mode: RenderMode,
    /// The instant open items are measured against.
    pub as_of: DateTime<Utc>,
}

/// A velocity report. Sections that were not requested are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<PullRequestStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<IssueStats>,
}

pub fn build_report(
    prs: Option<&[PullRequest]>,
    issues: Option<&[Issue]>,
    options: &ReportOptions,
) -> Report {
    Report {
        pull_request: prs.map(|prs| {
            summarize_pull_requests(prs, &options.team_members).render(options.mode)
        }),
        issues: issues.map(|issues| {
            summarize_issues(issues, &options.team_members, options.as_of).render(options.mode)
        }),
    }
}
