//! Find the release for a tag, creating it when absent

use super::{NewRelease, Release, ReleaseApi};
use crate::cli::OutputManager;
use crate::config::ReleaseTarget;
use crate::error::Result;

/// Return the release tagged `target.tag`, creating it if none exists
///
/// The first release with an exact tag match wins. A created release is never
/// rolled back, so a later failure can leave an empty or partial draft behind.
pub async fn locate_release<A: ReleaseApi>(
    api: &A,
    target: &ReleaseTarget,
    output: &OutputManager,
) -> Result<Release> {
    let releases = api.list_releases(&target.owner, &target.repo).await?;
    log::debug!(
        "{} release(s) listed for {}",
        releases.len(),
        target.slug()
    );

    if let Some(existing) = releases.into_iter().find(|r| r.tag_name == target.tag) {
        output.verbose(&format!(
            "Release {} found on {}/{} with {} existing asset(s)",
            existing.tag_name,
            target.host,
            target.slug(),
            existing.assets.len()
        ));
        return Ok(existing);
    }

    let created = api
        .create_release(&target.owner, &target.repo, &NewRelease::from(target))
        .await?;

    if created.draft {
        output.verbose_warn(&format!(
            "Release {} not found, so a draft release was created. YOU MUST MANUALLY PUBLISH THIS DRAFT WITHIN GITHUB FOR IT TO BE ACCESSIBLE.",
            created.tag_name
        ));
    } else {
        output.verbose(&format!(
            "Release {} not found, so a new release was created and published.",
            created.tag_name
        ));
    }

    Ok(created)
}
