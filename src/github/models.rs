//! GitHub REST payloads

use crate::config::ReleaseTarget;
use serde::{Deserialize, Serialize};

/// A release as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Release ID
    pub id: u64,
    /// Tag the release is attached to
    pub tag_name: String,
    /// Upload URL template, e.g. `https://uploads.github.com/.../assets{?name,label}`
    #[serde(default)]
    pub upload_url: String,
    /// Whether the release is a draft
    #[serde(default)]
    pub draft: bool,
    /// Assets already attached
    #[serde(default)]
    pub assets: Vec<AssetRef>,
}

impl Release {
    /// Whether an asset with this name is already attached
    pub fn has_asset(&self, name: &str) -> bool {
        self.assets.iter().any(|asset| asset.name == name)
    }
}

/// An asset attached to a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    /// Asset ID
    pub id: u64,
    /// File name
    pub name: String,
}

/// Body of a create-release request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRelease {
    /// Tag to create or reuse
    pub tag_name: String,
    /// Commitish for a new tag; the service picks the default branch when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_commitish: Option<String>,
    /// Release title
    pub name: String,
    /// Release notes
    pub body: String,
    /// Create as draft
    pub draft: bool,
    /// Mark as prerelease
    pub prerelease: bool,
}

impl From<&ReleaseTarget> for NewRelease {
    fn from(target: &ReleaseTarget) -> Self {
        Self {
            tag_name: target.tag.clone(),
            target_commitish: target.target_commitish.clone(),
            name: target.name.clone(),
            body: target.body.clone(),
            draft: target.draft,
            prerelease: target.prerelease,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_tolerates_missing_optional_fields() {
        let release: Release = serde_json::from_str(r#"{"id":7,"tag_name":"0.0.1"}"#).unwrap();
        assert!(release.assets.is_empty());
        assert!(!release.draft);
        assert!(!release.has_asset("filename"));
    }

    #[test]
    fn default_branch_is_left_to_the_service() {
        let body = serde_json::to_value(NewRelease {
            tag_name: "0.0.1".to_string(),
            target_commitish: None,
            name: "v0.0.1".to_string(),
            body: "test 0.0.1".to_string(),
            draft: true,
            prerelease: false,
        })
        .unwrap();
        assert!(body.get("target_commitish").is_none());
        assert_eq!(body["draft"], true);
    }
}
