use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which kind of record a snapshot entry was expected to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    PullRequest,
    Issue,
}

impl RecordKind {
    /// Key of this kind's array in the combined snapshot form.
    pub fn section(self) -> &'static str {
        match self {
            RecordKind::PullRequest => "prs",
            RecordKind::Issue => "issues",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::PullRequest => write!(f, "pull request"),
            RecordKind::Issue => write!(f, "issue"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to read snapshot {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Snapshot is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Snapshot must be an array of records or an object with `prs` and `issues` arrays")]
    UnexpectedShape,

    #[error("Snapshot has no `{}` section", .0.section())]
    MissingSection(RecordKind),

    #[error("Malformed {kind} record at index {index}: {source}")]
    MalformedRecord {
        kind: RecordKind,
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write snapshot {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
