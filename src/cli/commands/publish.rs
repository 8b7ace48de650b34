//! `publish` command

use crate::cli::{Args, OutputManager};
use crate::config::EnvConfig;
use crate::error::Result;

/// Execute publish command
pub(super) async fn execute_publish(args: &Args, env: &EnvConfig) -> Result<()> {
    let config = args.publish_config();
    let paths = args.project_paths();
    let output = OutputManager::new(config.verbose, false);

    output.verbose(&format!("Manifest: {}", paths.manifest.display()));
    crate::publish::publish(&paths, env, &config).await?;

    if config.verbose {
        output.success("Publish complete");
    }
    Ok(())
}
