//! Interpretation of the `--output` argument.

use std::path::{Path, PathBuf};

/// Where downloads go: a directory, plus a file name for single downloads
/// when `--output` named a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OutputTarget {
    pub directory: PathBuf,
    pub file_name: Option<String>,
}

impl OutputTarget {
    /// Splits `output` into directory and optional file name.
    ///
    /// An existing directory or a path ending in a separator is a directory.
    /// Anything else is a file path: its parent is the directory.
    pub(crate) fn resolve(output: &Path) -> Self {
        let raw = output.to_string_lossy();
        if output.as_os_str().is_empty() || output.is_dir() || raw.ends_with(['/', '\\']) {
            return Self::as_directory(output);
        }

        match (output.parent(), output.file_name()) {
            (Some(parent), Some(name)) => Self {
                directory: if parent.as_os_str().is_empty() {
                    PathBuf::from(".")
                } else {
                    parent.to_path_buf()
                },
                file_name: Some(name.to_string_lossy().into_owned()),
            },
            _ => Self::as_directory(output),
        }
    }

    /// Treats `path` as a directory regardless of its shape.
    pub(crate) fn as_directory(path: &Path) -> Self {
        let directory = if path.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            path.to_path_buf()
        };
        Self {
            directory,
            file_name: None,
        }
    }

    /// File name for a single download: `--filename` wins over the output path.
    pub(crate) fn single_file_name<'a>(&'a self, explicit: Option<&'a str>) -> Option<&'a str> {
        explicit
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .or(self.file_name.as_deref())
    }
}
