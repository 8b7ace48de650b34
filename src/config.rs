//! Release target resolution from package.json and the environment.
//!
//! `resolve_target` validates that the manifest names one GitHub repository
//! consistently (`repository.url` and `binary.host` must agree) and derives the
//! release tag and the local directory holding the staged files.

use crate::error::{ConfigError, Result};
use crate::metadata::PackageManifest;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Environment variable holding the GitHub access token
pub const TOKEN_ENV_VAR: &str = "NODE_PRE_GYP_GITHUB_TOKEN";

/// Placeholder replaced by the manifest version in `binary.remote_path`
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// User agent used when the manifest has no name
pub const DEFAULT_USER_AGENT: &str = "prebuilt_publish";

/// Snapshot of the process environment, taken once per run
#[derive(Clone, Default)]
pub struct EnvConfig {
    vars: HashMap<String, String>,
}

impl EnvConfig {
    /// Capture the current process environment
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Build from explicit pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Look up a variable, treating empty values as unset
    pub fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key).filter(|v| !v.is_empty()).cloned()
    }
}

impl fmt::Debug for EnvConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvConfig")
            .field("vars", &self.vars.len())
            .finish()
    }
}

/// Caller-supplied publish options
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// Create the release as a draft when it does not exist yet
    pub draft: bool,
    /// Emit progress lines
    pub verbose: bool,
    /// Branch or commit for a newly created release's tag; the repository's
    /// default branch when `None`
    pub target_commitish: Option<String>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            draft: true,
            verbose: true,
            target_commitish: None,
        }
    }
}

/// GitHub repository parsed from `repository.url`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryUrl {
    /// Web host, e.g. `github.com`
    pub host: String,
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
}

static REPOSITORY_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:git\+)?https?://(?P<host>[^/@]+)/(?P<owner>[^/]+)/(?P<repo>[^/#]+?)\.git/?(?:#.*)?$",
    )
    .expect("repository URL regex is valid")
});

impl RepositoryUrl {
    /// Parse `[git+]http(s)://host/owner/repo.git`, ignoring any `#fragment`
    pub fn parse(url: &str) -> Result<Self> {
        let caps = REPOSITORY_URL_RE.captures(url.trim()).ok_or_else(|| {
            ConfigError::MalformedRepositoryUrl {
                url: url.to_string(),
            }
        })?;

        Ok(Self {
            host: caps["host"].to_string(),
            owner: caps["owner"].to_string(),
            repo: caps["repo"].to_string(),
        })
    }

    /// Host shown to users
    pub fn display_host(&self) -> &str {
        &self.host
    }

    /// Host serving the REST API
    pub fn api_host(&self) -> String {
        format!("api.{}", self.host)
    }

    /// Prefix `binary.host` must start with once its scheme is API-prefixed
    pub fn download_prefix(&self) -> String {
        format!(
            "https://{}/{}/{}/releases/download/",
            self.api_host(),
            self.owner,
            self.repo
        )
    }
}

/// Everything that identifies the release to publish into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTarget {
    /// Web host, e.g. `github.com`
    pub host: String,
    /// API host, e.g. `api.github.com`
    pub api_host: String,
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Release tag
    pub tag: String,
    /// Release title
    pub name: String,
    /// Release notes
    pub body: String,
    /// Create as draft
    pub draft: bool,
    /// Mark as prerelease
    pub prerelease: bool,
    /// Commitish for a newly created tag
    pub target_commitish: Option<String>,
}

impl ReleaseTarget {
    /// `owner/repo`
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// Resolved target plus the credential and local paths for one run
#[derive(Clone)]
pub struct ResolvedConfig {
    /// Release to publish into
    pub target: ReleaseTarget,
    /// GitHub access token
    pub token: String,
    /// User agent for API requests
    pub user_agent: String,
    /// Directory holding the files to upload
    pub stage_dir: PathBuf,
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("target", &self.target)
            .field("token", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .field("stage_dir", &self.stage_dir)
            .finish()
    }
}

/// Derive the release target, token and stage directory for a run
pub fn resolve_target(
    manifest: &PackageManifest,
    env: &EnvConfig,
    stage_root: &Path,
    options: &PublishConfig,
) -> Result<ResolvedConfig> {
    let repository_url = manifest
        .repository_url()
        .ok_or(ConfigError::MissingRepositoryUrl)?;
    let repository = RepositoryUrl::parse(repository_url)?;

    let binary_host = manifest
        .binary_host()
        .ok_or(ConfigError::MissingBinaryHost)?;
    let expected_prefix = repository.download_prefix();
    let normalized_host = binary_host.replacen("https://", "https://api.", 1);
    let Some(host_suffix) = normalized_host.strip_prefix(&expected_prefix) else {
        return Err(ConfigError::BinaryHostMismatch { expected_prefix }.into());
    };

    let version = manifest
        .version
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingVersion)?;

    let (tag, stage_dir) = match manifest.remote_path() {
        Some(remote_path) => {
            let tagged = format!("v{}", version);
            if host_suffix
                .split('/')
                .any(|segment| segment == version || segment == tagged)
            {
                return Err(ConfigError::AmbiguousVersionSource {
                    version: version.to_string(),
                }
                .into());
            }
            let tag = remote_path.replace(VERSION_PLACEHOLDER, version);
            let stage_dir = stage_root.join(&tag);
            (tag, stage_dir)
        }
        // Older manifests bake the version into binary.host
        None => (version.to_string(), stage_root.to_path_buf()),
    };

    let token = env.get(TOKEN_ENV_VAR).ok_or(ConfigError::MissingToken {
        var: TOKEN_ENV_VAR,
    })?;

    let package_name = manifest.name.as_deref().filter(|n| !n.is_empty());

    let target = ReleaseTarget {
        host: repository.display_host().to_string(),
        api_host: repository.api_host(),
        owner: repository.owner.clone(),
        repo: repository.repo.clone(),
        tag,
        name: format!("v{}", version),
        body: format!("{} {}", package_name.unwrap_or(&repository.repo), version),
        draft: options.draft,
        prerelease: false,
        target_commitish: options.target_commitish.clone(),
    };

    log::debug!("Resolved release target {:?}", target);

    Ok(ResolvedConfig {
        target,
        token,
        user_agent: package_name.unwrap_or(DEFAULT_USER_AGENT).to_string(),
        stage_dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PublishError;

    const VALID: &str = r#"{"name":"test","version":"0.0.1","repository":{"url":"git+https://github.com/test/test.git"},"binary":{"host":"https://github.com/test/test/releases/download/","remote_path":"{version}"}}"#;

    fn env() -> EnvConfig {
        EnvConfig::from_pairs([(TOKEN_ENV_VAR, "secret")])
    }

    fn resolve(json: &str, env: &EnvConfig) -> Result<ResolvedConfig> {
        let manifest = PackageManifest::from_json(json).unwrap();
        resolve_target(
            &manifest,
            env,
            Path::new("/project/build/stage"),
            &PublishConfig::default(),
        )
    }

    #[test]
    fn parses_repository_url_forms() {
        for url in [
            "git+https://github.com/test/repo.git",
            "https://github.com/test/repo.git",
            "http://github.com/test/repo.git",
        ] {
            let parsed = RepositoryUrl::parse(url).unwrap();
            assert_eq!(parsed.host, "github.com");
            assert_eq!(parsed.owner, "test");
            assert_eq!(parsed.repo, "repo");
        }
    }

    #[test]
    fn accepts_uppercase_scheme_and_fragment() {
        let parsed =
            RepositoryUrl::parse("GIT+HTTPS://github.com/test/repo.git#semver:^1").unwrap();
        assert_eq!(parsed.host, "github.com");
        assert_eq!(parsed.owner, "test");
        assert_eq!(parsed.repo, "repo");

        let parsed = RepositoryUrl::parse("https://github.com/test/repo.GIT").unwrap();
        assert_eq!(parsed.repo, "repo");
    }

    #[test]
    fn rejects_malformed_repository_urls() {
        for url in [
            "bad_format_url",
            "https://github.com/test/repo",
            "git@github.com:test/repo.git",
            "https://github.com/test.git",
        ] {
            assert!(
                matches!(
                    RepositoryUrl::parse(url),
                    Err(PublishError::Config(ConfigError::MalformedRepositoryUrl { .. }))
                ),
                "{url} should be rejected"
            );
        }
    }

    #[test]
    fn display_and_api_hosts_share_one_source() {
        let parsed = RepositoryUrl::parse("https://ghe.example.com/acme/tool.git").unwrap();
        assert_eq!(parsed.display_host(), "ghe.example.com");
        assert_eq!(parsed.api_host(), "api.ghe.example.com");
        assert_eq!(
            parsed.download_prefix(),
            "https://api.ghe.example.com/acme/tool/releases/download/"
        );
    }

    #[test]
    fn remote_path_sets_tag_and_stage_subdir() {
        let resolved = resolve(VALID, &env()).unwrap();
        assert_eq!(resolved.target.tag, "0.0.1");
        assert_eq!(resolved.stage_dir, Path::new("/project/build/stage/0.0.1"));
        assert_eq!(resolved.target.name, "v0.0.1");
        assert_eq!(resolved.target.body, "test 0.0.1");
        assert!(resolved.target.draft);
        assert!(!resolved.target.prerelease);
        assert_eq!(resolved.target.api_host, "api.github.com");
        assert_eq!(resolved.user_agent, "test");
    }

    #[test]
    fn placeholder_replaced_everywhere() {
        let json = VALID.replace(
            r#""remote_path":"{version}""#,
            r#""remote_path":"v{version}/{version}""#,
        );
        let resolved = resolve(&json, &env()).unwrap();
        assert_eq!(resolved.target.tag, "v0.0.1/0.0.1");
    }

    #[test]
    fn legacy_manifest_uses_version_as_tag() {
        let json = r#"{"name":"test","version":"1.2.3","repository":{"url":"git+https://github.com/test/test.git"},"binary":{"host":"https://github.com/test/test/releases/download/1.2.3/"}}"#;
        let resolved = resolve(json, &env()).unwrap();
        assert_eq!(resolved.target.tag, "1.2.3");
        assert_eq!(resolved.stage_dir, Path::new("/project/build/stage"));
    }

    #[test]
    fn version_in_both_places_is_rejected() {
        let json = r#"{"version":"1.2.3","repository":{"url":"git+https://github.com/test/test.git"},"binary":{"host":"https://github.com/test/test/releases/download/1.2.3/","remote_path":"{version}"}}"#;
        assert!(matches!(
            resolve(json, &env()),
            Err(PublishError::Config(ConfigError::AmbiguousVersionSource { .. }))
        ));
    }

    #[test]
    fn tagged_version_segment_is_ambiguous() {
        let json = r#"{"version":"1.2.3","repository":{"url":"git+https://github.com/test/test.git"},"binary":{"host":"https://github.com/test/test/releases/download/v1.2.3","remote_path":"{version}"}}"#;
        assert!(matches!(
            resolve(json, &env()),
            Err(PublishError::Config(ConfigError::AmbiguousVersionSource { .. }))
        ));
    }

    #[test]
    fn version_inside_unrelated_segment_is_not_ambiguous() {
        let json = r#"{"version":"1","repository":{"url":"git+https://github.com/test/test.git"},"binary":{"host":"https://github.com/test/test/releases/download/build1/","remote_path":"{version}"}}"#;
        let resolved = resolve(json, &env()).unwrap();
        assert_eq!(resolved.target.tag, "1");
        assert_eq!(resolved.stage_dir, Path::new("/project/build/stage/1"));
    }

    #[test]
    fn missing_repository_url() {
        for json in ["{}", r#"{"repository":{}}"#, r#"{"repository":"test/test"}"#] {
            assert!(matches!(
                resolve(json, &env()),
                Err(PublishError::Config(ConfigError::MissingRepositoryUrl))
            ));
        }
    }

    #[test]
    fn missing_binary_host() {
        for json in [
            r#"{"repository":{"url":"git+https://github.com/test/test.git"}}"#,
            r#"{"repository":{"url":"git+https://github.com/test/test.git"},"binary":"x"}"#,
            r#"{"repository":{"url":"git+https://github.com/test/test.git"},"binary":{"host":1}}"#,
        ] {
            assert!(matches!(
                resolve(json, &env()),
                Err(PublishError::Config(ConfigError::MissingBinaryHost))
            ));
        }
    }

    #[test]
    fn binary_host_must_match_repository() {
        for host in [
            "bad_format_binary",
            "https://github.com/other/test/releases/download/",
            "https://example.com/test/test/releases/download/",
        ] {
            let json = format!(
                r#"{{"repository":{{"url":"git+https://github.com/test/test.git"}},"binary":{{"host":"{host}"}}}}"#
            );
            let err = resolve(&json, &env()).unwrap_err();
            assert!(
                err.to_string()
                    .starts_with("binary.host in package.json should begin with:"),
                "{err}"
            );
        }
    }

    #[test]
    fn missing_or_empty_token() {
        for env in [EnvConfig::default(), EnvConfig::from_pairs([(TOKEN_ENV_VAR, "")])] {
            let err = resolve(VALID, &env).unwrap_err();
            assert_eq!(
                err.to_string(),
                "NODE_PRE_GYP_GITHUB_TOKEN environment variable not found"
            );
        }
    }

    #[test]
    fn missing_version() {
        let json = VALID.replace(r#""version":"0.0.1","#, "");
        assert!(matches!(
            resolve(&json, &env()),
            Err(PublishError::Config(ConfigError::MissingVersion))
        ));
    }

    #[test]
    fn nameless_package_falls_back() {
        let json = VALID.replace(r#""name":"test","#, "");
        let resolved = resolve(&json, &env()).unwrap();
        assert_eq!(resolved.target.body, "test 0.0.1");
        assert_eq!(resolved.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn debug_output_redacts_token() {
        let resolved = resolve(VALID, &env()).unwrap();
        assert!(!format!("{resolved:?}").contains("secret"));
    }
}
