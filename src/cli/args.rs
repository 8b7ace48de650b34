//! Command line argument parsing and validation.

use crate::config::PublishConfig;
use crate::publish::ProjectPaths;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Publish prebuilt binaries to GitHub releases
#[derive(Parser, Debug)]
#[command(
    name = "prebuilt_publish",
    version,
    about = "Publish staged prebuilt binaries to the project's GitHub release",
    long_about = "Uploads the contents of build/stage/{version} to the GitHub release named by package.json.

The repository comes from repository.url, the release tag from version and
binary.remote_path. Set NODE_PRE_GYP_GITHUB_TOKEN to a token with repo scope."
)]
pub struct Args {
    /// Command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Publish the contents of build/stage/{version} to the current version's GitHub release
    Publish {
        /// Publish immediately, do not create a draft
        #[arg(short, long)]
        release: bool,

        /// Turn verbose messages off
        #[arg(short, long)]
        silent: bool,

        /// Project directory containing package.json
        #[arg(long, value_name = "DIR", default_value = ".")]
        project_dir: PathBuf,

        /// Staging root (defaults to <project-dir>/build/stage)
        #[arg(long, value_name = "DIR")]
        stage_dir: Option<PathBuf>,

        /// Branch or commit for a newly created release tag
        #[arg(long, value_name = "REF")]
        target_commitish: Option<String>,
    },
}

impl Command {
    /// Command name for messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Publish { .. } => "publish",
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        match &self.command {
            Command::Publish {
                target_commitish: Some(commitish),
                ..
            } if commitish.trim().is_empty() => {
                Err("--target-commitish must not be empty".to_string())
            }
            _ => Ok(()),
        }
    }

    /// Publish options derived from the flags
    pub fn publish_config(&self) -> PublishConfig {
        match &self.command {
            Command::Publish {
                release,
                silent,
                target_commitish,
                ..
            } => PublishConfig {
                draft: !release,
                verbose: !silent,
                target_commitish: target_commitish.clone(),
            },
        }
    }

    /// Manifest and staging paths derived from the flags
    pub fn project_paths(&self) -> ProjectPaths {
        match &self.command {
            Command::Publish {
                project_dir,
                stage_dir,
                ..
            } => {
                let mut paths = ProjectPaths::from_project_dir(project_dir);
                if let Some(stage_dir) = stage_dir {
                    paths.stage_root = stage_dir.clone();
                }
                paths
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn defaults_to_verbose_draft() {
        let args = Args::try_parse_from(["prebuilt_publish", "publish"]).unwrap();
        let config = args.publish_config();
        assert!(config.draft);
        assert!(config.verbose);
        assert_eq!(config.target_commitish, None);
        assert_eq!(
            args.project_paths().stage_root,
            Path::new(".").join("build").join("stage")
        );
    }

    #[test]
    fn release_and_silent_flags() {
        let args = Args::try_parse_from(["prebuilt_publish", "publish", "-r", "-s"]).unwrap();
        let config = args.publish_config();
        assert!(!config.draft);
        assert!(!config.verbose);
    }

    #[test]
    fn path_overrides() {
        let args = Args::try_parse_from([
            "prebuilt_publish",
            "publish",
            "--project-dir",
            "/work/addon",
            "--stage-dir",
            "/tmp/stage",
        ])
        .unwrap();
        let paths = args.project_paths();
        assert_eq!(paths.manifest, Path::new("/work/addon/package.json"));
        assert_eq!(paths.stage_root, Path::new("/tmp/stage"));
    }

    #[test]
    fn empty_commitish_is_invalid() {
        let args =
            Args::try_parse_from(["prebuilt_publish", "publish", "--target-commitish", " "])
                .unwrap();
        assert!(args.validate().is_err());
    }
}
