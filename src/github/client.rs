//! reqwest-backed GitHub REST client

use super::{AssetRef, NewRelease, Release, ReleaseApi};
use crate::config::ResolvedConfig;
use crate::error::{RemoteError, Result};
use bytes::Bytes;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";
const RELEASES_PER_PAGE: &str = "100";

/// Error body returned by the REST API
#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// GitHub release API client authenticated with a bearer token
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_base: String,
}

impl GitHubClient {
    /// Client for the API host derived from the manifest
    pub fn new(resolved: &ResolvedConfig) -> Result<Self> {
        Self::with_base_url(
            format!("https://{}", resolved.target.api_host),
            &resolved.token,
            &resolved.user_agent,
        )
    }

    /// Client for an explicit API base URL
    pub fn with_base_url(
        api_base: impl Into<String>,
        token: &str,
        user_agent: &str,
    ) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| {
            RemoteError::ClientInit {
                reason: format!("invalid token: {}", e),
            }
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );

        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .build()
            .map_err(|e| RemoteError::ClientInit {
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    fn releases_url(&self, owner: &str, repo: &str) -> String {
        format!("{}/repos/{}/{}/releases", self.api_base, owner, repo)
    }
}

/// Read a failed response into the service's message
async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ApiErrorBody>(&text) {
        Ok(body) => format!("{} ({})", body.message, status),
        Err(_) if text.is_empty() => status.to_string(),
        Err(_) => format!("{} ({})", text, status),
    }
}

/// Expand an RFC 6570 upload URL template with the asset name
fn asset_upload_url(upload_url: &str, file_name: &str) -> std::result::Result<url::Url, String> {
    let base = upload_url.split('{').next().unwrap_or(upload_url);
    let mut url = url::Url::parse(base)
        .map_err(|e| format!("invalid upload_url '{}': {}", upload_url, e))?;
    url.query_pairs_mut().append_pair("name", file_name);
    Ok(url)
}

impl ReleaseApi for GitHubClient {
    async fn list_releases(&self, owner: &str, repo: &str) -> Result<Vec<Release>> {
        let url = self.releases_url(owner, repo);
        log::debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .query(&[("per_page", RELEASES_PER_PAGE)])
            .send()
            .await
            .map_err(|e| RemoteError::ReleaseList {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(RemoteError::ReleaseList {
                reason: error_message(response).await,
            }
            .into());
        }

        let releases = response
            .json::<Vec<Release>>()
            .await
            .map_err(|e| RemoteError::ReleaseList {
                reason: e.to_string(),
            })?;
        Ok(releases)
    }

    async fn create_release(
        &self,
        owner: &str,
        repo: &str,
        release: &NewRelease,
    ) -> Result<Release> {
        let url = self.releases_url(owner, repo);
        log::debug!("POST {} tag={}", url, release.tag_name);

        let response = self
            .http
            .post(&url)
            .json(release)
            .send()
            .await
            .map_err(|e| RemoteError::ReleaseCreate {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(RemoteError::ReleaseCreate {
                reason: error_message(response).await,
            }
            .into());
        }

        let created = response
            .json::<Release>()
            .await
            .map_err(|e| RemoteError::ReleaseCreate {
                reason: e.to_string(),
            })?;
        Ok(created)
    }

    async fn upload_asset(
        &self,
        release: &Release,
        file_name: &str,
        content_type: &str,
        content: Bytes,
    ) -> Result<AssetRef> {
        let upload_error = |reason: String| RemoteError::AssetUpload {
            file: file_name.to_string(),
            reason,
        };

        if release.upload_url.is_empty() {
            let reason = format!("release {} has no upload_url", release.tag_name);
            return Err(upload_error(reason).into());
        }
        let url = asset_upload_url(&release.upload_url, file_name).map_err(upload_error)?;
        log::debug!("POST {} ({} bytes, {})", url, content.len(), content_type);

        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .body(content)
            .send()
            .await
            .map_err(|e| upload_error(e.to_string()))?;

        if !response.status().is_success() {
            return Err(upload_error(error_message(response).await).into());
        }

        let asset = response
            .json::<AssetRef>()
            .await
            .map_err(|e| upload_error(e.to_string()))?;
        Ok(asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_upload_template() {
        let url = asset_upload_url(
            "https://uploads.github.com/repos/test/test/releases/1/assets{?name,label}",
            "app v1.tar.gz",
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://uploads.github.com/repos/test/test/releases/1/assets?name=app+v1.tar.gz"
        );
    }

    #[test]
    fn rejects_unparseable_upload_url() {
        assert!(asset_upload_url("not a url{?name}", "x").is_err());
    }

    #[test]
    fn trims_trailing_slash_from_base() {
        let client = GitHubClient::with_base_url("https://api.github.com/", "t", "ua").unwrap();
        assert_eq!(
            client.releases_url("o", "r"),
            "https://api.github.com/repos/o/r/releases"
        );
    }
}
