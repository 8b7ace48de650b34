//! Compare staged files against a release's existing assets.
//!
//! A name collision is fatal: existing assets are never replaced or skipped,
//! the operator has to delete them on GitHub first.

use crate::cli::OutputManager;
use crate::error::{ReconcileError, Result};
use crate::github::Release;
use crate::stage::StagedFile;
use std::path::Path;

/// Decide which staged files to upload to `release`
///
/// Checks against the asset snapshot taken when the release was resolved and
/// stops at the first collision in enumeration order.
pub fn plan_uploads(
    release: &Release,
    stage_dir: &Path,
    staged: Vec<StagedFile>,
    output: &OutputManager,
) -> Result<Vec<StagedFile>> {
    if staged.is_empty() {
        return Err(ReconcileError::EmptyStageDirectory {
            path: stage_dir.to_path_buf(),
        }
        .into());
    }

    for file in &staged {
        if release.has_asset(&file.file_name) {
            return Err(ReconcileError::AssetAlreadyExists {
                file: file.file_name.clone(),
                tag: release.tag_name.clone(),
            }
            .into());
        }
        output.verbose(&format!(
            "Staged file {} found. Proceeding to upload it.",
            file.file_name
        ));
    }

    Ok(staged)
}
