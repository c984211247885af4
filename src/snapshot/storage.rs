use atomic_write_file::AtomicWriteFile;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use super::error::SnapshotError;
use super::SnapshotDocument;
use crate::model::{Issue, PullRequest};

/// Read and parse a snapshot file. The whole document is held in memory.
fn read_document(path: &Path) -> Result<SnapshotDocument, SnapshotError> {
    let text = std::fs::read_to_string(path).map_err(|source| SnapshotError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    SnapshotDocument::parse(&text)
}

/// Load pull requests from a flat or combined snapshot.
pub fn load_pull_requests(path: &Path, as_of: DateTime<Utc>) -> Result<Vec<PullRequest>, SnapshotError> {
    let prs = read_document(path)?.pull_requests(as_of)?;
    tracing::debug!(path = %path.display(), count = prs.len(), "Loaded pull requests from snapshot");
    Ok(prs)
}

/// Load issues from a flat or combined snapshot.
pub fn load_issues(path: &Path) -> Result<Vec<Issue>, SnapshotError> {
    let issues = read_document(path)?.issues()?;
    tracing::debug!(path = %path.display(), count = issues.len(), "Loaded issues from snapshot");
    Ok(issues)
}

/// Load both sections from a combined snapshot.
pub fn load_combined(path: &Path, as_of: DateTime<Utc>) -> Result<(Vec<PullRequest>, Vec<Issue>), SnapshotError> {
    let (prs, issues) = read_document(path)?.combined(as_of)?;
    tracing::debug!(
        path = %path.display(),
        prs = prs.len(),
        issues = issues.len(),
        "Loaded combined snapshot"
    );
    Ok((prs, issues))
}

/// Write `value` as pretty JSON, atomically: the file at `path` is either
/// the previous content or the complete new snapshot.
pub fn save_snapshot<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), SnapshotError> {
    let write_error = |source: std::io::Error| SnapshotError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = AtomicWriteFile::open(path).map_err(write_error)?;
    serde_json::to_writer_pretty(&mut file, value).map_err(|e| write_error(e.into()))?;
    file.write_all(b"\n").map_err(write_error)?;
    file.commit().map_err(write_error)?;

    tracing::info!(path = %path.display(), "Wrote snapshot");
    Ok(())
}
