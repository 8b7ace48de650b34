//! Error types for prebuilt_publish operations.
//!
//! Every error is terminal for a publish run. Variants carry enough context to
//! be the sole diagnostic shown to the user, and `recovery_suggestions` adds
//! the manual step needed before a retry.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for prebuilt_publish operations
pub type Result<T> = std::result::Result<T, PublishError>;

/// Main error type for all prebuilt_publish operations
#[derive(Error, Debug)]
pub enum PublishError {
    /// Manifest-derived configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Errors reported by the hosted release service
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Staged files do not fit the target release
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    /// Directory enumeration or file read failure
    #[error("{}: {source}", .path.display())]
    Filesystem {
        /// Path being read
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// package.json could not be parsed
    #[error("Failed to parse {}: {source}", .path.display())]
    Manifest {
        /// Path to the manifest
        path: PathBuf,
        /// JSON error
        #[source]
        source: serde_json::Error,
    },
}

/// Configuration errors raised while resolving the release target
#[derive(Error, Debug)]
pub enum ConfigError {
    /// `repository.url` absent
    #[error("Missing repository.url in package.json")]
    MissingRepositoryUrl,

    /// `repository.url` is not `scheme://host/owner/repo.git`
    #[error("A correctly formatted GitHub repository.url was not found within package.json (found '{url}')")]
    MalformedRepositoryUrl {
        /// The offending URL
        url: String,
    },

    /// `binary.host` absent or not a string
    #[error("Missing binary.host in package.json")]
    MissingBinaryHost,

    /// `binary.host` does not point at the repository's release downloads
    #[error("binary.host in package.json should begin with: \"{expected_prefix}\"")]
    BinaryHostMismatch {
        /// Required prefix after scheme normalization
        expected_prefix: String,
    },

    /// `version` absent
    #[error("Missing version in package.json")]
    MissingVersion,

    /// Both `binary.remote_path` and a version-bearing `binary.host` are set
    #[error(
        "binary.host in package.json already contains version {version} while binary.remote_path is also set; use only one of them"
    )]
    AmbiguousVersionSource {
        /// Manifest version
        version: String,
    },

    /// Access token not present in the environment
    #[error("{var} environment variable not found")]
    MissingToken {
        /// Name of the expected variable
        var: &'static str,
    },
}

/// Errors from the hosted release API, carrying the service's message verbatim
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Listing releases failed
    #[error("{reason}")]
    ReleaseList {
        /// Service or transport message
        reason: String,
    },

    /// Creating the release failed
    #[error("{reason}")]
    ReleaseCreate {
        /// Service or transport message
        reason: String,
    },

    /// Uploading an asset failed
    #[error("{reason}")]
    AssetUpload {
        /// Asset file name
        file: String,
        /// Service or transport message
        reason: String,
    },

    /// The HTTP client could not be built
    #[error("Failed to initialize GitHub client: {reason}")]
    ClientInit {
        /// Reason for the error
        reason: String,
    },
}

/// Reconciliation errors between staged files and remote assets
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Nothing to publish
    #[error("No files found within the stage directory: {}", .path.display())]
    EmptyStageDirectory {
        /// Stage directory that was enumerated
        path: PathBuf,
    },

    /// Staged file name already attached to the release
    #[error(
        "Staged file {file} found but it already exists in release {tag}. If you would like to replace it, you must first manually delete it within GitHub."
    )]
    AssetAlreadyExists {
        /// Conflicting file name
        file: String,
        /// Release tag
        tag: String,
    },
}

impl PublishError {
    /// Wrap an IO error with the path it concerns
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PublishError::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            PublishError::Config(ConfigError::MissingRepositoryUrl)
            | PublishError::Config(ConfigError::MalformedRepositoryUrl { .. }) => vec![
                "Add a repository entry to package.json, e.g. \"repository\": {\"url\": \"git+https://github.com/owner/repo.git\"}"
                    .to_string(),
            ],
            PublishError::Config(ConfigError::MissingBinaryHost) => vec![
                "Add binary.host to package.json, e.g. \"https://github.com/owner/repo/releases/download/\""
                    .to_string(),
            ],
            PublishError::Config(ConfigError::BinaryHostMismatch { expected_prefix }) => vec![
                format!(
                    "Point binary.host at {}",
                    expected_prefix.replacen("https://api.", "https://", 1)
                ),
                "Check that repository.url names the same owner and repository".to_string(),
            ],
            PublishError::Config(ConfigError::AmbiguousVersionSource { .. }) => vec![
                "Remove the version from binary.host and keep it in binary.remote_path".to_string(),
            ],
            PublishError::Config(ConfigError::MissingToken { var }) => vec![
                format!("Export a GitHub token with repo scope: export {}=<token>", var),
            ],
            PublishError::Reconcile(ReconcileError::AssetAlreadyExists { file, tag }) => vec![
                format!("Delete asset '{}' from release {} on GitHub, then retry", file, tag),
            ],
            PublishError::Reconcile(ReconcileError::EmptyStageDirectory { .. }) => vec![
                "Build and package the binaries first (e.g. node-pre-gyp package)".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_errors_keep_service_message() {
        let err = PublishError::from(RemoteError::ReleaseList {
            reason: "listReleases error".to_string(),
        });
        assert_eq!(err.to_string(), "listReleases error");
    }

    #[test]
    fn collision_suggests_manual_delete() {
        let err = PublishError::from(ReconcileError::AssetAlreadyExists {
            file: "app.tar.gz".to_string(),
            tag: "1.0.0".to_string(),
        });
        let suggestions = err.recovery_suggestions();
        assert!(suggestions[0].contains("Delete asset 'app.tar.gz'"));
    }
}
