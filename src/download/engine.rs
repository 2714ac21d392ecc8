//! Download engine: the strategy chain plus destination handling.
//!
//! # Example
//!
//! ```no_run
//! use gofile_core::api::{ApiClient, ContentDescriptor, Credentials};
//! use gofile_core::download::DownloadEngine;
//! use gofile_core::{GofileConfig, resolver};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GofileConfig::new();
//! let api = ApiClient::new(&config)?;
//! let engine = DownloadEngine::new(&config)?;
//!
//! let id = resolver::resolve("https://gofile.io/d/abc123").ok_or("bad link")?;
//! if let ContentDescriptor::File(file) = api.fetch(&id, &Credentials::default()).await? {
//!     let outcome = engine.download_file(&file, Path::new("./downloads"), None, None).await?;
//!     println!("success: {}", outcome.is_success());
//! }
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use tracing::instrument;

use super::DownloadError;
use super::batch::{BatchError, BatchResult, download_folder};
use super::chain::{DownloadOutcome, StrategyChain};
use super::filename::sanitize_filename;
use super::strategy::DownloadRequest;
use crate::api::{FileDescriptor, FolderDescriptor};
use crate::config::GofileConfig;
use crate::resolver::ContentId;

/// Entry point for file and folder downloads.
#[derive(Debug)]
pub struct DownloadEngine {
    chain: StrategyChain,
}

impl DownloadEngine {
    /// Creates an engine with the default strategy chain.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::ClientBuild`] if a strategy client cannot be built.
    pub fn new(config: &GofileConfig) -> Result<Self, DownloadError> {
        Ok(Self::with_chain(StrategyChain::from_config(config)?))
    }

    /// Creates an engine over a custom chain.
    #[must_use]
    pub fn with_chain(chain: StrategyChain) -> Self {
        Self { chain }
    }

    /// The strategy chain in use.
    #[must_use]
    pub fn chain(&self) -> &StrategyChain {
        &self.chain
    }

    /// Path a single-file download writes to.
    #[must_use]
    pub fn file_destination(
        file: &FileDescriptor,
        directory: &Path,
        custom_name: Option<&str>,
    ) -> PathBuf {
        let name = custom_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map_or_else(|| file.display_name(), str::to_string);
        directory.join(sanitize_filename(&name))
    }

    /// Downloads one file into `directory`, overwriting an existing file of the
    /// same name. Folder downloads suffix duplicates instead; see
    /// [`download_folder`].
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::MissingLink`] when the descriptor has no link and
    /// [`DownloadError::Io`] when the directory cannot be created. Transfer
    /// failures are reported through the returned [`DownloadOutcome`].
    #[instrument(skip(self, file), fields(file = %file.id))]
    pub async fn download_file(
        &self,
        file: &FileDescriptor,
        directory: &Path,
        custom_name: Option<&str>,
        page_id: Option<&ContentId>,
    ) -> Result<DownloadOutcome, DownloadError> {
        let link = file.link.as_deref().ok_or_else(|| DownloadError::MissingLink {
            file: file.id.to_string(),
        })?;

        tokio::fs::create_dir_all(directory)
            .await
            .map_err(|e| DownloadError::io(directory, e))?;

        let destination = Self::file_destination(file, directory, custom_name);
        let mut request = DownloadRequest::new(link, destination)
            .with_display_name(file.display_name())
            .with_expected_size(file.size)
            .with_content_id(file.id.clone());
        if let Some(page_id) = page_id {
            request = request.with_page_id(page_id.clone());
        }

        Ok(self.chain.download(&request).await)
    }

    /// Downloads the file children of `folder`; see [`download_folder`].
    ///
    /// # Errors
    ///
    /// Returns [`BatchError`] when the folder has no files or the destination
    /// cannot be created.
    pub async fn download_folder(
        &self,
        folder: &FolderDescriptor,
        destination_root: &Path,
        custom_folder_name: Option<&str>,
    ) -> Result<BatchResult, BatchError> {
        download_folder(&self.chain, folder, destination_root, custom_folder_name).await
    }
}
