//! Collaborator traits for upstream data sources

#[cfg(test)]
use mockall::automock;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// One match record from an artifact search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub group_id: String,
    pub artifact_id: String,
    pub latest_version: String,
    /// Number of published versions, a rough popularity signal
    pub version_count: u64,
    /// Last-publish time in milliseconds since the epoch
    pub timestamp: i64,
}

impl SearchHit {
    pub fn coordinate(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }
}

/// Upstream artifact repository (Maven Central or compatible).
///
/// Every call may fail with not-found, rate-limit, or transport errors;
/// those are exactly the failures the retry layer interprets.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ArtifactRegistry: Send + Sync {
    /// Whether any artifact exists at `(group_id, artifact_id)`.
    async fn exists_package(&self, group_id: &str, artifact_id: &str) -> Result<bool, Error>;

    /// All known versions, newest first per the upstream's recency sort.
    async fn list_versions(
        &self,
        group_id: &str,
        artifact_id: &str,
    ) -> Result<Vec<String>, Error>;

    /// Raw manifest (POM) text for one concrete version.
    async fn fetch_manifest(
        &self,
        group_id: &str,
        artifact_id: &str,
        version: &str,
    ) -> Result<String, Error>;

    /// Free-text artifact search, at most `limit` records.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, Error>;
}

/// Source-hosting site used as a best-effort fallback for documentation.
/// Never required for version-resolution correctness.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait SourceHost: Send + Sync {
    async fn fetch_readme(&self, owner: &str, repo: &str) -> Result<String, Error>;
}
