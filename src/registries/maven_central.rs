//! Maven Central registry implementation
//!
//! Search, existence checks, and version listings go through the
//! `search.maven.org` solrsearch JSON API; manifests (POMs) come straight
//! from the `repo1.maven.org` repository layout.

use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::config::FETCH_TIMEOUT;
use crate::error::Error;
use crate::registry::{ArtifactRegistry, SearchHit};

/// Default base URL for the search API
const DEFAULT_SEARCH_BASE_URL: &str = "https://search.maven.org";

/// Default base URL for the repository content
const DEFAULT_REPO_BASE_URL: &str = "https://repo1.maven.org/maven2";

/// Cap on version rows requested per listing call
const MAX_VERSION_ROWS: usize = 200;

/// Envelope around every solrsearch response body
#[derive(Debug, Deserialize)]
struct SolrResponse<D> {
    response: SolrBody<D>,
}

#[derive(Debug, Deserialize)]
struct SolrBody<D> {
    #[serde(rename = "numFound")]
    num_found: u64,
    docs: Vec<D>,
}

/// Doc shape from the `gav` core (one doc per version)
#[derive(Debug, Deserialize)]
struct GavDoc {
    v: String,
}

/// Doc shape from the default core (one doc per artifact)
#[derive(Debug, Deserialize)]
struct ArtifactDoc {
    g: String,
    a: String,
    #[serde(rename = "latestVersion")]
    latest_version: String,
    #[serde(rename = "versionCount", default)]
    version_count: u64,
    #[serde(default)]
    timestamp: i64,
}

pub struct MavenCentralRegistry {
    client: reqwest::Client,
    search_base_url: String,
    repo_base_url: String,
}

impl MavenCentralRegistry {
    /// Creates a registry client against custom base URLs.
    pub fn new(search_base_url: &str, repo_base_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("maven-meta")
                .timeout(FETCH_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            search_base_url: search_base_url.to_string(),
            repo_base_url: repo_base_url.to_string(),
        }
    }

    /// Lucene query pinning one exact coordinate.
    fn coordinate_query(group_id: &str, artifact_id: &str) -> String {
        format!("g:\"{group_id}\" AND a:\"{artifact_id}\"")
    }

    /// Maps non-success statuses to typed errors; `subject` names what was
    /// being looked up so 404s read as package-not-found.
    fn check_status(response: &Response, url: &str, subject: &str) -> Result<(), Error> {
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(subject.to_string()));
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
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
            warn!("Upstream returned status {status}: {url}");
            return Err(Error::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(())
    }

    async fn solr_query<D: DeserializeOwned>(
        &self,
        params: &[(&str, &str)],
        subject: &str,
    ) -> Result<SolrBody<D>, Error> {
        let url = format!("{}/solrsearch/select", self.search_base_url);

        let response = self.client.get(&url).query(params).send().await?;
        Self::check_status(&response, &url, subject)?;

        let body: SolrResponse<D> = response.json().await?;
        Ok(body.response)
    }
}

impl Default for MavenCentralRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_BASE_URL, DEFAULT_REPO_BASE_URL)
    }
}

#[async_trait::async_trait]
impl ArtifactRegistry for MavenCentralRegistry {
    async fn exists_package(&self, group_id: &str, artifact_id: &str) -> Result<bool, Error> {
        let query = Self::coordinate_query(group_id, artifact_id);
        let subject = format!("{group_id}:{artifact_id}");

        let body: SolrBody<ArtifactDoc> = self
            .solr_query(&[("q", query.as_str()), ("rows", "0"), ("wt", "json")], &subject)
            .await?;

        Ok(body.num_found > 0)
    }

    async fn list_versions(
        &self,
        group_id: &str,
        artifact_id: &str,
    ) -> Result<Vec<String>, Error> {
        let query = Self::coordinate_query(group_id, artifact_id);
        let subject = format!("{group_id}:{artifact_id}");
        let rows = MAX_VERSION_ROWS.to_string();

        // The gav core returns one doc per version, newest first
        let body: SolrBody<GavDoc> = self
            .solr_query(
                &[
                    ("q", query.as_str()),
                    ("core", "gav"),
                    ("rows", rows.as_str()),
                    ("wt", "json"),
                ],
                &subject,
            )
            .await?;

        Ok(body.docs.into_iter().map(|doc| doc.v).collect())
    }

    async fn fetch_manifest(
        &self,
        group_id: &str,
        artifact_id: &str,
        version: &str,
    ) -> Result<String, Error> {
        let group_path = group_id.replace('.', "/");
        let url = format!(
            "{}/{group_path}/{artifact_id}/{version}/{artifact_id}-{version}.pom",
            self.repo_base_url
        );
        let subject = format!("{group_id}:{artifact_id}:{version}");

        let response = self.client.get(&url).send().await?;
        Self::check_status(&response, &url, &subject)?;

        Ok(response.text().await?)
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, Error> {
        let rows = limit.to_string();

        let body: SolrBody<ArtifactDoc> = self
            .solr_query(
                &[("q", query), ("rows", rows.as_str()), ("wt", "json")],
                query,
            )
            .await?;

        Ok(body
            .docs
            .into_iter()
            .map(|doc| SearchHit {
                group_id: doc.g,
                artifact_id: doc.a,
                latest_version: doc.latest_version,
                version_count: doc.version_count,
                timestamp: doc.timestamp,
            })
            .collect())
    }
}
