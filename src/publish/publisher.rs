//! Sequential publish workflow

use crate::cli::OutputManager;
use crate::config::{EnvConfig, PublishConfig, ResolvedConfig, resolve_target};
use crate::error::Result;
use crate::github::{GitHubClient, ReleaseApi, locate_release};
use crate::metadata::{MANIFEST_FILE, load_manifest};
use crate::reconcile::plan_uploads;
use crate::stage::enumerate_stage_dir;
use bytes::Bytes;
use std::path::{Path, PathBuf};

/// Where a project's manifest and staged binaries live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    /// package.json
    pub manifest: PathBuf,
    /// Root of the staging tree, before any `remote_path` sub-directory
    pub stage_root: PathBuf,
}

impl ProjectPaths {
    /// node-pre-gyp layout: `package.json` and `build/stage` under `project_dir`
    pub fn from_project_dir(project_dir: &Path) -> Self {
        Self {
            manifest: project_dir.join(MANIFEST_FILE),
            stage_root: project_dir.join("build").join("stage"),
        }
    }
}

/// Drives one publish run against a release API
///
/// Network calls are made one at a time. The first failure ends the run and
/// is returned unchanged; assets uploaded before it stay on the release.
pub struct Publisher<A> {
    api: A,
    output: OutputManager,
}

impl<A: ReleaseApi> Publisher<A> {
    /// Create a publisher whose progress output follows `config.verbose`
    pub fn new(api: A, config: &PublishConfig) -> Self {
        Self {
            api,
            output: OutputManager::new(config.verbose, false),
        }
    }

    /// Create a publisher that reports progress through `output`
    pub fn with_output(api: A, output: OutputManager) -> Self {
        Self { api, output }
    }

    /// Access the progress output
    pub fn output(&self) -> &OutputManager {
        &self.output
    }

    /// Access the underlying API client
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Upload every staged file to the release described by `resolved`
    pub async fn publish(&self, resolved: &ResolvedConfig) -> Result<()> {
        let target = &resolved.target;
        log::info!("Publishing {} release {}", target.slug(), target.tag);

        let release = locate_release(&self.api, target, &self.output).await?;

        self.output.verbose(&format!(
            "Stage directory path: {}",
            resolved.stage_dir.display()
        ));
        let staged = enumerate_stage_dir(&resolved.stage_dir, &self.output).await?;
        let queue = plan_uploads(&release, &resolved.stage_dir, staged, &self.output)?;

        for file in queue {
            let content = file.read().await?;
            let asset = self
                .api
                .upload_asset(
                    &release,
                    &file.file_name,
                    file.content_type,
                    Bytes::from(content),
                )
                .await?;
            log::debug!("Uploaded {} as asset {}", file.file_name, asset.id);
            self.output.verbose(&format!(
                "Staged file {} saved to {}/{} release {} successfully.",
                file.file_name,
                target.host,
                target.slug(),
                release.tag_name
            ));
        }

        Ok(())
    }
}

/// Publish a project's staged binaries to GitHub
///
/// Reads the manifest, resolves the release target from it and `env`, then
/// runs a [`Publisher`] backed by [`GitHubClient`].
pub async fn publish(
    paths: &ProjectPaths,
    env: &EnvConfig,
    config: &PublishConfig,
) -> Result<()> {
    let manifest = load_manifest(&paths.manifest).await?;
    let resolved = resolve_target(&manifest, env, &paths.stage_root, config)?;
    let client = GitHubClient::new(&resolved)?;
    Publisher::new(client, config).publish(&resolved).await
}
