//! GitHub source-host implementation
//!
//! Best-effort README fetch through the GitHub API. Failures here never
//! affect version resolution; callers treat the result as optional.

use reqwest::{Response, StatusCode};
use tracing::warn;

use crate::config::FETCH_TIMEOUT;
use crate::error::Error;
use crate::registry::SourceHost;

/// Default base URL for the GitHub API
const DEFAULT_BASE_URL: &str = "https://api.github.com";

pub struct GitHubSourceHost {
    client: reqwest::Client,
    base_url: String,
}

impl GitHubSourceHost {
    /// Creates a source-host client with a custom base URL.
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("maven-meta")
                .timeout(FETCH_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.to_string(),
        }
    }

    fn check_status(response: &Response, url: &str, subject: &str) -> Result<(), Error> {
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(subject.to_string()));
        }

        if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::FORBIDDEN {
            // GitHub signals rate limiting with 403 as well as 429
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(Error::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            warn!("GitHub API returned status {status}: {url}");
            return Err(Error::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(())
    }
}

impl Default for GitHubSourceHost {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait::async_trait]
impl SourceHost for GitHubSourceHost {
    async fn fetch_readme(&self, owner: &str, repo: &str) -> Result<String, Error> {
        let url = format!("{}/repos/{owner}/{repo}/readme", self.base_url);
        let subject = format!("{owner}/{repo}");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github.raw+json")
            .send()
            .await?;
        Self::check_status(&response, &url, &subject)?;

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn fetch_readme_returns_raw_content() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/spring-projects/spring-boot/readme")
            .match_header("accept", "application/vnd.github.raw+json")
            .with_status(200)
            .with_body("# Spring Boot")
            .create_async()
            .await;

        let host = GitHubSourceHost::new(&server.url());
        let readme = host
            .fetch_readme("spring-projects", "spring-boot")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(readme, "# Spring Boot");
    }

    #[tokio::test]
    async fn fetch_readme_maps_404_to_not_found() {
        let mut server = Server::new_async().await;

        server
            .mock("GET", "/repos/no/repo/readme")
            .with_status(404)
            .create_async()
            .await;

        let host = GitHubSourceHost::new(&server.url());
        let result = host.fetch_readme("no", "repo").await;

        assert!(matches!(result, Err(Error::NotFound(ref subject)) if subject == "no/repo"));
    }

    #[tokio::test]
    async fn forbidden_is_treated_as_rate_limiting() {
        let mut server = Server::new_async().await;

        server
            .mock("GET", "/repos/some/repo/readme")
            .with_status(403)
            .with_header("retry-after", "120")
            .create_async()
            .await;

        let host = GitHubSourceHost::new(&server.url());
        let result = host.fetch_readme("some", "repo").await;

        assert!(matches!(
            result,
            Err(Error::RateLimited {
                retry_after_secs: Some(120)
            })
        ));
    }
}
