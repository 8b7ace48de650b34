//! package.json loading.
//!
//! Only the fields needed to locate the release are typed. `repository` and
//! `binary` stay loosely typed so that a wrong shape surfaces as the specific
//! configuration error instead of a parse failure.

use crate::error::{PublishError, Result};
use serde::Deserialize;
use std::path::Path;

/// Manifest file name looked up in the project directory
pub const MANIFEST_FILE: &str = "package.json";

/// The subset of package.json used for publishing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageManifest {
    /// Package name
    #[serde(default)]
    pub name: Option<String>,
    /// Package version
    #[serde(default)]
    pub version: Option<String>,
    /// `repository` entry, usually `{ "type": "git", "url": "..." }`
    #[serde(default)]
    pub repository: Option<serde_json::Value>,
    /// node-pre-gyp `binary` section
    #[serde(default)]
    pub binary: Option<serde_json::Value>,
}

impl PackageManifest {
    /// Parse manifest JSON text
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// `repository.url`, when present as a string
    pub fn repository_url(&self) -> Option<&str> {
        self.repository.as_ref()?.get("url")?.as_str()
    }

    /// `binary.host`, when `binary` is an object and `host` a string
    pub fn binary_host(&self) -> Option<&str> {
        self.binary.as_ref()?.as_object()?.get("host")?.as_str()
    }

    /// `binary.remote_path`; empty strings count as absent
    pub fn remote_path(&self) -> Option<&str> {
        self.binary
            .as_ref()?
            .get("remote_path")?
            .as_str()
            .filter(|path| !path.is_empty())
    }
}

/// Load package.json from disk
pub async fn load_manifest(path: &Path) -> Result<PackageManifest> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| PublishError::filesystem(path, e))?;

    log::debug!("Loaded manifest {}", path.display());

    PackageManifest::from_json(&content).map_err(|source| PublishError::Manifest {
        path: path.to_path_buf(),
        source,
    })
}
