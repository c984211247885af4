pub mod aggregate;
pub mod issues;
pub mod pull_request;
pub mod report;

pub use aggregate::{average, median, Aggregate};
pub use issues::{issue_stats, summarize_issues, IssueStats, IssueSummary};
pub use pull_request::{pull_request_stats, summarize_pull_requests, PullRequestStats, PullRequestSummary};
pub use report::{build_report, Report, ReportOptions};
