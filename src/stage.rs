//! Staged artifact enumeration.
//!
//! The stage directory holds the packaged binaries waiting for upload. Entries
//! are returned sorted by file name so repeated runs see the same order.

use crate::cli::OutputManager;
use crate::error::{PublishError, Result};
use std::path::{Path, PathBuf};

/// A local file queued for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// Asset name (the file name)
    pub file_name: String,
    /// Full path on disk
    pub file_path: PathBuf,
    /// MIME type sent with the upload
    pub content_type: &'static str,
}

impl StagedFile {
    /// Describe the file at `file_path`
    pub fn new(file_name: impl Into<String>, file_path: impl Into<PathBuf>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name);
        Self {
            file_name,
            file_path: file_path.into(),
            content_type,
        }
    }

    /// Read the file contents
    pub async fn read(&self) -> Result<Vec<u8>> {
        tokio::fs::read(&self.file_path)
            .await
            .map_err(|e| PublishError::filesystem(&self.file_path, e))
    }
}

/// Detect MIME type for an artifact from its file name
pub fn content_type_for(file_name: &str) -> &'static str {
    let lower = file_name.to_ascii_lowercase();
    if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
        return "application/gzip";
    }

    match Path::new(&lower).extension().and_then(|e| e.to_str()) {
        Some("gz") => "application/gzip",
        Some("zip") => "application/zip",
        Some("tar") => "application/x-tar",
        Some("xz") => "application/x-xz",
        Some("bz2") => "application/x-bzip2",
        Some("7z") => "application/x-7z-compressed",
        Some("json") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        Some("md") => "text/markdown; charset=utf-8",
        Some("js") => "application/javascript; charset=utf-8",
        Some("wasm") => "application/wasm",
        Some("exe") | Some("dll") => "application/x-msdownload",
        Some("deb") => "application/vnd.debian.binary-package",
        Some("rpm") => "application/x-rpm",
        Some("dmg") => "application/x-apple-diskimage",
        _ => "application/octet-stream",
    }
}

/// List the regular files in `stage_dir`, sorted by name
///
/// Symlinks are followed. Subdirectories and other non-file entries are
/// skipped with a warning.
pub async fn enumerate_stage_dir(
    stage_dir: &Path,
    output: &OutputManager,
) -> Result<Vec<StagedFile>> {
    let mut entries = tokio::fs::read_dir(stage_dir)
        .await
        .map_err(|e| PublishError::filesystem(stage_dir, e))?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| PublishError::filesystem(stage_dir, e))?
    {
        let path = entry.path();
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| PublishError::filesystem(&path, e))?;

        if !metadata.is_file() {
            output.warn(&format!("Skipping non-file entry: {}", path.display()));
            continue;
        }

        let Some(file_name) = entry.file_name().to_str().map(str::to_owned) else {
            output.verbose_warn(&format!("Skipping non-UTF-8 file name: {}", path.display()));
            continue;
        };

        files.push(StagedFile::new(file_name, path));
    }

    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    log::debug!("{} staged file(s) in {}", files.len(), stage_dir.display());
    Ok(files)
}
