use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT},
    Client, RequestBuilder,
};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

use crate::github::{GitHubError, PublicEvent, RepoSummary};

const GITHUB_API_BASE: &str = "https://api.github.com";
const REPOS_PER_PAGE: u8 = 100;

/// The snapshot cycle talks to GitHub through this seam so tests can
/// substitute a recording fake.
#[async_trait]
pub trait GitHubFetcher: Send + Sync {
    async fn list_repos(
        &self,
        account: &str,
        token: Option<&str>,
    ) -> Result<Vec<RepoSummary>, GitHubError>;

    async fn list_public_events(
        &self,
        account: &str,
        token: Option<&str>,
    ) -> Result<Vec<PublicEvent>, GitHubError>;
}

pub struct GitHubClient {
    client: Client,
}

impl GitHubClient {
    pub fn new() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static("GitHub-Snapshot-Service/1.0"),
        );
        headers.insert(
            "Accept",
            HeaderValue::from_static("application/vnd.github.v3+json"),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(headers)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    fn authorize(&self, request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => request.header(AUTHORIZATION, format!("token {}", token)),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        account: &str,
        token: Option<&str>,
    ) -> Result<T, GitHubError> {
        debug!("Fetching: {}", url);

        let request = self.authorize(self.client.get(url), token);
        let response = request.send().await?;
        let status = response.status();

        if status == 404 {
            return Err(GitHubError::AccountNotFound(account.to_string()));
        }

        if status == 403 {
            // Distinguish an exhausted rate limit from a permission problem
            if let Some(remaining) = response.headers().get("X-RateLimit-Remaining") {
                if remaining == "0" {
                    return Err(GitHubError::RateLimit);
                }
            }
            return Err(GitHubError::ApiError {
                status: status.as_u16(),
                message: "Forbidden - check API token permissions".to_string(),
            });
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GitHubError::ApiError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        Ok(response.json().await?)
    }
}

impl Default for GitHubClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GitHubFetcher for GitHubClient {
    /// Lists up to the first 100 repositories owned by the account.
    async fn list_repos(
        &self,
        account: &str,
        token: Option<&str>,
    ) -> Result<Vec<RepoSummary>, GitHubError> {
        let url = format!(
            "{}/users/{}/repos?per_page={}",
            GITHUB_API_BASE, account, REPOS_PER_PAGE
        );

        let repos: Vec<RepoSummary> = self.get_json(&url, account, token).await?;
        info!("Fetched {} repos for account: {}", repos.len(), account);
        Ok(repos)
    }

    async fn list_public_events(
        &self,
        account: &str,
        token: Option<&str>,
    ) -> Result<Vec<PublicEvent>, GitHubError> {
        let url = format!("{}/users/{}/events/public", GITHUB_API_BASE, account);

        let events: Vec<PublicEvent> = self.get_json(&url, account, token).await?;
        info!("Fetched {} public events for account: {}", events.len(), account);
        Ok(events)
    }
}
