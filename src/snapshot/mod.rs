//! Snapshots: JSON captures of fetched pull requests and issues, replayed
//! later to recompute reports without querying GitHub again.
//!
//! Two document forms are accepted: a flat array of one kind of record, or
//! an object with `prs` and `issues` arrays. Records are validated against
//! their schema and rebuilt through the same constructors live data uses,
//! so derived durations are recomputed rather than trusted.

pub mod error;
pub mod storage;

pub use error::{RecordKind, SnapshotError};
pub use storage::{load_combined, load_issues, load_pull_requests, save_snapshot};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::model::{Issue, IssueRecord, PullRequest, PullRequestRecord};

/// The combined snapshot form written by `ga log`.
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub prs: &'a [PullRequest],
    pub issues: &'a [Issue],
}

/// A parsed snapshot document whose records are not validated yet.
#[derive(Debug)]
pub enum SnapshotDocument {
    Flat(Vec<Value>),
    Combined {
        prs: Option<Vec<Value>>,
        issues: Option<Vec<Value>>,
    },
}

impl SnapshotDocument {
    pub fn parse(text: &str) -> Result<Self, SnapshotError> {
        let value: Value = serde_json::from_str(text).map_err(SnapshotError::InvalidJson)?;
        match value {
            Value::Array(records) => Ok(SnapshotDocument::Flat(records)),
            Value::Object(mut map) => {
                let mut section = |kind: RecordKind| match map.remove(kind.section()) {
                    None => Ok(None),
                    Some(Value::Array(records)) => Ok(Some(records)),
                    Some(_) => Err(SnapshotError::UnexpectedShape),
                };
                let prs = section(RecordKind::PullRequest)?;
                let issues = section(RecordKind::Issue)?;
                Ok(SnapshotDocument::Combined { prs, issues })
            }
            _ => Err(SnapshotError::UnexpectedShape),
        }
    }

    /// The records of `kind`. A flat document is taken to hold that kind.
    fn section(self, kind: RecordKind) -> Result<Vec<Value>, SnapshotError> {
        match self {
            SnapshotDocument::Flat(records) => Ok(records),
            SnapshotDocument::Combined { prs, issues } => {
                let section = match kind {
                    RecordKind::PullRequest => prs,
                    RecordKind::Issue => issues,
                };
                section.ok_or(SnapshotError::MissingSection(kind))
            }
        }
    }

    /// Both sections; only the combined form carries them.
    fn sections(self) -> Result<(Vec<Value>, Vec<Value>), SnapshotError> {
        match self {
            SnapshotDocument::Flat(_) => Err(SnapshotError::MissingSection(RecordKind::Issue)),
            SnapshotDocument::Combined { prs, issues } => Ok((
                prs.ok_or(SnapshotError::MissingSection(RecordKind::PullRequest))?,
                issues.ok_or(SnapshotError::MissingSection(RecordKind::Issue))?,
            )),
        }
    }

    pub fn pull_requests(self, as_of: DateTime<Utc>) -> Result<Vec<PullRequest>, SnapshotError> {
        materialize_pull_requests(self.section(RecordKind::PullRequest)?, as_of)
    }

    pub fn issues(self) -> Result<Vec<Issue>, SnapshotError> {
        materialize_issues(self.section(RecordKind::Issue)?)
    }

    pub fn combined(self, as_of: DateTime<Utc>) -> Result<(Vec<PullRequest>, Vec<Issue>), SnapshotError> {
        let (prs, issues) = self.sections()?;
        Ok((materialize_pull_requests(prs, as_of)?, materialize_issues(issues)?))
    }
}

fn decode_records<T: DeserializeOwned>(records: Vec<Value>, kind: RecordKind) -> Result<Vec<T>, SnapshotError> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value(value)
                .map_err(|source| SnapshotError::MalformedRecord { kind, index, source })
        })
        .collect()
}

/// Rebuild pull requests from snapshot records, recomputing derived fields
/// as of `as_of`.
pub fn materialize_pull_requests(records: Vec<Value>, as_of: DateTime<Utc>) -> Result<Vec<PullRequest>, SnapshotError> {
    let records: Vec<PullRequestRecord> = decode_records(records, RecordKind::PullRequest)?;
    Ok(records
        .into_iter()
        .map(|record| PullRequest::new(record, as_of))
        .collect())
}

pub fn materialize_issues(records: Vec<Value>) -> Result<Vec<Issue>, SnapshotError> {
    let records: Vec<IssueRecord> = decode_records(records, RecordKind::Issue)?;
    Ok(records.into_iter().map(Issue::new).collect())
}
