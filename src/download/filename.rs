//! Filename sanitization and destination path resolution.
//!
//! Names come from the remote API and are untrusted: they are sanitized before
//! being joined to a local directory.

use std::path::{Component, Path, PathBuf};

/// Sanitizes a remote file or folder name for filesystem safety.
///
/// Replaces characters that are invalid on common filesystems
/// (`/ \ : * ? " < > |` and control characters) with `_`, and neutralizes
/// names that would resolve to `.`/`..`.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        return "_".to_string();
    }

    if is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized.replace('.', "_")
    }
}

/// Resolves a path in `dir` for `filename` that does not exist yet.
///
/// Example: `file.zip`, then `file_1.zip`, `file_2.zip`, ...
#[must_use]
pub fn resolve_unique_path(dir: &Path, filename: &str) -> PathBuf {
    let filename = sanitize_filename(filename);
    let base_path = dir.join(&filename);

    if !base_path.exists() {
        return base_path;
    }

    let (stem, ext) = split_extension(&filename);
    for i in 1..1000 {
        let candidate = dir.join(format!("{stem}_{i}{ext}"));
        if !candidate.exists() {
            return candidate;
        }
    }

    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    dir.join(format!("{stem}_{timestamp}{ext}"))
}

/// Lowercased extension of `filename` without the dot, if any.
#[must_use]
pub fn extension_of(filename: &str) -> Option<String> {
    let name = Path::new(filename).file_name()?.to_str()?;
    let (stem, ext) = split_extension(name);
    if stem.is_empty() || ext.len() <= 1 {
        return None;
    }
    Some(ext[1..].to_ascii_lowercase())
}

/// Splits `name` into stem and extension (extension keeps its leading dot).
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(pos) if pos > 0 => (&name[..pos], &name[pos..]),
        _ => (name, ""),
    }
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}
