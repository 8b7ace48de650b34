//! GitHub integration for release lookup and asset upload

mod client;
mod locator;
mod models;

pub use client::GitHubClient;
pub use locator::locate_release;
pub use models::{AssetRef, NewRelease, Release};

use crate::error::Result;
use bytes::Bytes;
use std::future::Future;

/// Operations the publisher needs from the hosted release service
///
/// Implementations report failures as `RemoteError` variants carrying the
/// service's message text.
pub trait ReleaseApi {
    /// List the repository's releases in the order the service returns them
    fn list_releases(
        &self,
        owner: &str,
        repo: &str,
    ) -> impl Future<Output = Result<Vec<Release>>> + Send;

    /// Create a release
    fn create_release(
        &self,
        owner: &str,
        repo: &str,
        release: &NewRelease,
    ) -> impl Future<Output = Result<Release>> + Send;

    /// Attach a file to a release
    fn upload_asset(
        &self,
        release: &Release,
        file_name: &str,
        content_type: &str,
        content: Bytes,
    ) -> impl Future<Output = Result<AssetRef>> + Send;
}
