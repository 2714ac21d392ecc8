//! Folder downloads: one level of a folder's file children, sequentially.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, instrument, warn};

use super::chain::{DownloadOutcome, StrategyChain};
use super::filename::{resolve_unique_path, sanitize_filename};
use super::strategy::DownloadRequest;
use crate::api::{ContentDescriptor, FolderDescriptor};

/// Errors that stop a folder download before any file is attempted.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The folder has no file-typed children.
    #[error("no files in folder {folder}")]
    NoFiles {
        /// Folder id.
        folder: String,
    },

    /// The destination directory could not be created.
    #[error("failed to create directory {path}: {source}")]
    CreateDirectory {
        /// Directory path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Aggregate result of a folder download.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    /// Files handed to the strategy chain.
    pub attempted: usize,
    /// Files the chain completed.
    pub succeeded: usize,
    /// File children skipped for a missing link or name.
    pub skipped: usize,
    /// Per-file outcomes keyed by display name, in download order.
    pub outcomes: Vec<(String, DownloadOutcome)>,
    /// Directory the files were written to.
    pub destination: PathBuf,
}

impl BatchResult {
    /// True when at least one file succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.succeeded > 0
    }

    /// Files that were attempted and failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded
    }

    /// Names and reasons of the failed files.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outcomes.iter().filter_map(|(name, outcome)| {
            outcome
                .failure_reason()
                .map(|reason| (name.as_str(), reason))
        })
    }

    /// Folds another result's counts and outcomes into this one.
    pub fn absorb(&mut self, other: Self) {
        self.attempted += other.attempted;
        self.succeeded += other.succeeded;
        self.skipped += other.skipped;
        self.outcomes.extend(other.outcomes);
    }
}

/// Directory a folder download writes into.
#[must_use]
pub fn effective_destination(root: &Path, custom_folder_name: Option<&str>) -> PathBuf {
    match custom_folder_name.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => root.join(sanitize_filename(name)),
        None => root.to_path_buf(),
    }
}

/// Downloads every file child of `folder` into `destination_root`, or into
/// `destination_root/<custom_folder_name>` when a name is given.
///
/// Sub-folders are not descended into. Per-file failures are tallied, never
/// propagated.
///
/// Existing files are never overwritten: a name already on disk gets a
/// `_1`, `_2`, ... suffix, so re-running a folder download keeps earlier
/// copies. Single-file downloads through
/// [`DownloadEngine::download_file`](super::DownloadEngine::download_file)
/// write to the exact path instead and replace what is there.
///
/// # Errors
///
/// Returns [`BatchError::NoFiles`] when the folder has no file children and
/// [`BatchError::CreateDirectory`] when the destination cannot be created.
#[instrument(skip(chain, folder), fields(folder = %folder.id))]
pub async fn download_folder(
    chain: &StrategyChain,
    folder: &FolderDescriptor,
    destination_root: &Path,
    custom_folder_name: Option<&str>,
) -> Result<BatchResult, BatchError> {
    let file_count = folder.file_count();
    if file_count == 0 {
        return Err(BatchError::NoFiles {
            folder: folder.id.to_string(),
        });
    }

    let destination = effective_destination(destination_root, custom_folder_name);
    tokio::fs::create_dir_all(&destination)
        .await
        .map_err(|source| BatchError::CreateDirectory {
            path: destination.clone(),
            source,
        })?;

    info!(files = file_count, destination = %destination.display(), "downloading folder");

    let mut result = BatchResult {
        destination: destination.clone(),
        ..BatchResult::default()
    };

    for child in &folder.children {
        let ContentDescriptor::File(file) = child else {
            continue;
        };
        let (Some(link), Some(name)) = (file.link.as_deref(), file.name.as_deref()) else {
            warn!(file = %file.id, "skipping file without link or name");
            result.skipped += 1;
            continue;
        };

        let path = resolve_unique_path(&destination, name);
        let request = DownloadRequest::new(link, path)
            .with_display_name(name)
            .with_expected_size(file.size)
            .with_content_id(file.id.clone())
            .with_page_id(folder.id.clone());

        result.attempted += 1;
        let outcome = chain.download(&request).await;
        if outcome.is_success() {
            result.succeeded += 1;
        }
        result.outcomes.push((name.to_string(), outcome));
    }

    info!(
        succeeded = result.succeeded,
        attempted = result.attempted,
        skipped = result.skipped,
        "folder download finished"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_destination() {
        let root = Path::new("/tmp/out");
        assert_eq!(effective_destination(root, None), root);
        assert_eq!(effective_destination(root, Some("  ")), root);
        assert_eq!(
            effective_destination(root, Some("Album")),
            root.join("Album")
        );
        assert_eq!(
            effective_destination(root, Some("../up")),
            root.join(".._up")
        );
    }

    #[test]
    fn test_batch_result_success_and_absorb() {
        let mut total = BatchResult::default();
        assert!(!total.is_success());

        total.absorb(BatchResult {
            attempted: 2,
            succeeded: 1,
            skipped: 1,
            ..BatchResult::default()
        });
        assert!(total.is_success());
        assert_eq!(total.failed(), 1);
        assert_eq!(total.skipped, 1);
    }
}
