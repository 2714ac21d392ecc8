//! Command orchestration: resolve, fetch metadata, download, summarize.

mod output;

use std::collections::VecDeque;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gofile_core::api::{ApiClient, ContentDescriptor, Credentials, FileDescriptor, FolderDescriptor};
use gofile_core::download::{
    BatchError, BatchResult, DownloadEngine, DownloadOutcome, effective_destination,
};
use gofile_core::resolver::{self, ContentId};
use gofile_core::GofileConfig;
use tracing::{debug, error, info, warn};

use crate::cli::Args;
use output::OutputTarget;

/// Runs one invocation. Returns whether the download succeeded.
pub(crate) async fn run(args: &Args) -> Result<bool> {
    let target = if args.all {
        OutputTarget::as_directory(&args.output)
    } else {
        OutputTarget::resolve(&args.output)
    };
    tokio::fs::create_dir_all(&target.directory)
        .await
        .with_context(|| format!("failed to create {}", target.directory.display()))?;

    let show_progress = !args.quiet && !args.no_progress && io::stderr().is_terminal();
    let mut config = GofileConfig::new()
        .with_api_base_url(args.api_url.as_str())
        .with_website_base_url(args.website_url.as_str())
        .with_token(args.token.clone())
        .with_progress(show_progress);

    let api = ApiClient::new(&config).context("failed to build API client")?;

    if config.token.is_none() && !args.no_guest {
        match api.create_guest_account().await {
            Ok(token) => {
                info!("using guest account token");
                config = config.with_token(Some(token));
            }
            Err(e) => warn!(error = %e, "guest account unavailable, continuing without token"),
        }
    }

    let id = resolver::resolve(&args.content).unwrap_or_else(|| {
        warn!(input = %args.content, "could not extract a content id, using input as-is");
        ContentId::from_raw(args.content.trim())
    });

    let credentials = Credentials::new(config.token.clone(), args.password.clone());
    let descriptor = api
        .fetch(&id, &credentials)
        .await
        .with_context(|| format!("failed to fetch metadata for {id}"))?;

    let engine = DownloadEngine::new(&config).context("failed to set up download strategies")?;

    match descriptor {
        ContentDescriptor::PasswordRequired { id, .. } => {
            error!(id = %id, "content is password protected; pass --password");
            Ok(false)
        }
        ContentDescriptor::File(file) => {
            download_single(&engine, &file, &target, args.filename.as_deref(), Some(&id)).await
        }
        ContentDescriptor::Folder(folder) if args.all => {
            let tree = FolderTree {
                api: &api,
                credentials: &credentials,
                engine: &engine,
                recursive: args.recursive,
            };
            let custom_name = args.filename.as_deref();
            match tree.download(folder, &target.directory, custom_name).await {
                Ok(result) => Ok(report_batch(&result)),
                Err(e) => {
                    error!("{e}");
                    Ok(false)
                }
            }
        }
        ContentDescriptor::Folder(folder) => match folder.first_file() {
            Some(file) => {
                download_single(
                    &engine,
                    file,
                    &target,
                    args.filename.as_deref(),
                    Some(&folder.id),
                )
                .await
            }
            None => {
                error!(folder = %folder.id, "no file found in folder; use --all with --recursive for nested folders");
                Ok(false)
            }
        },
    }
}

async fn download_single(
    engine: &DownloadEngine,
    file: &FileDescriptor,
    target: &OutputTarget,
    explicit_name: Option<&str>,
    page_id: Option<&ContentId>,
) -> Result<bool> {
    let custom_name = target.single_file_name(explicit_name);
    info!(
        file = %file.display_name(),
        directory = %target.directory.display(),
        "downloading file"
    );

    let outcome = engine
        .download_file(file, &target.directory, custom_name, page_id)
        .await
        .with_context(|| format!("cannot download {}", file.display_name()))?;

    match &outcome {
        DownloadOutcome::Completed {
            path,
            bytes,
            strategy,
            ..
        } => {
            info!(path = %path.display(), bytes, strategy = %strategy, "downloaded");
        }
        DownloadOutcome::Failed { reason, attempts } => {
            error!(file = %file.display_name(), "{reason}");
            for attempt in attempts {
                warn!("  {attempt}");
            }
        }
    }
    Ok(outcome.is_success())
}

/// Folder download, optionally descending into sub-folders.
struct FolderTree<'a> {
    api: &'a ApiClient,
    credentials: &'a Credentials,
    engine: &'a DownloadEngine,
    recursive: bool,
}

impl FolderTree<'_> {
    /// Downloads `root` and, when recursive, each sub-folder into a directory
    /// named after it. Sub-folders are processed breadth-first, one at a time.
    async fn download(
        &self,
        root: FolderDescriptor,
        destination_root: &Path,
        custom_name: Option<&str>,
    ) -> Result<BatchResult, BatchError> {
        let root_id = root.id.to_string();
        let mut total = BatchResult {
            destination: effective_destination(destination_root, custom_name),
            ..BatchResult::default()
        };
        let mut pending: VecDeque<(FolderDescriptor, PathBuf, Option<String>)> =
            VecDeque::from([(
                root,
                destination_root.to_path_buf(),
                custom_name.map(str::to_string),
            )]);

        while let Some((folder, parent, name)) = pending.pop_front() {
            let destination = effective_destination(&parent, name.as_deref());

            match self
                .engine
                .download_folder(&folder, &parent, name.as_deref())
                .await
            {
                Ok(result) => total.absorb(result),
                Err(BatchError::NoFiles { folder: id }) if self.recursive => {
                    debug!(folder = %id, "folder has no files of its own");
                }
                Err(e) => return Err(e),
            }

            if self.recursive {
                for sub in folder.subfolders() {
                    let sub_name = sub.name.clone().unwrap_or_else(|| sub.id.to_string());
                    match self.fetch_folder(&sub.id).await {
                        Ok(child) => pending.push_back((child, destination.clone(), Some(sub_name))),
                        Err(reason) => {
                            warn!(folder = %sub_name, "{reason}");
                            total.attempted += 1;
                            total.outcomes.push((
                                sub_name,
                                DownloadOutcome::Failed {
                                    reason,
                                    attempts: Vec::new(),
                                },
                            ));
                        }
                    }
                }
            }
        }

        if total.attempted == 0 && total.skipped == 0 {
            return Err(BatchError::NoFiles { folder: root_id });
        }
        Ok(total)
    }

    async fn fetch_folder(&self, id: &ContentId) -> Result<FolderDescriptor, String> {
        match self.api.fetch(id, self.credentials).await {
            Ok(ContentDescriptor::Folder(folder)) => Ok(folder),
            Ok(ContentDescriptor::PasswordRequired { .. }) => {
                Err("sub-folder is password protected".to_string())
            }
            Ok(ContentDescriptor::File(_)) => Err("expected a folder, got a file".to_string()),
            Err(e) => Err(format!("failed to fetch sub-folder: {e}")),
        }
    }
}

/// Logs the batch summary and returns overall success.
fn report_batch(result: &BatchResult) -> bool {
    for (name, reason) in result.failures() {
        warn!(file = %name, "failed: {reason}");
    }
    if result.skipped > 0 {
        warn!(skipped = result.skipped, "files without link or name were skipped");
    }

    if result.is_success() {
        info!(
            succeeded = result.succeeded,
            attempted = result.attempted,
            destination = %result.destination.display(),
            "folder download finished"
        );
    } else {
        error!(
            attempted = result.attempted,
            "no files could be downloaded"
        );
    }
    result.is_success()
}
