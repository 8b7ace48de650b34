//! # prebuilt_publish
//!
//! Publishes locally staged prebuilt binaries to a GitHub release.
//!
//! The repository, API host and release tag are derived from `package.json`
//! (`repository.url`, `binary.host`, `binary.remote_path`, `version`). Staged
//! files are uploaded one at a time; a file whose name already exists on the
//! release stops the run, since existing assets are never replaced.
//!
//! ## Usage
//!
//! ```bash
//! export NODE_PRE_GYP_GITHUB_TOKEN=...
//! prebuilt_publish publish            # upload into a draft release
//! prebuilt_publish publish --release  # create the release published
//! prebuilt_publish publish --silent   # no progress output
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cli;
pub mod config;
pub mod error;
pub mod github;
pub mod metadata;
pub mod publish;
pub mod reconcile;
pub mod stage;

// Re-export main types for public API
pub use config::{EnvConfig, PublishConfig, ReleaseTarget, ResolvedConfig, resolve_target};
pub use error::{PublishError, Result};
pub use github::{AssetRef, GitHubClient, Release, ReleaseApi};
pub use metadata::PackageManifest;
pub use publish::{ProjectPaths, Publisher, publish};
pub use stage::StagedFile;
