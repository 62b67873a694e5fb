//! Metadata resolution service
//!
//! Owns the cache and the upstream collaborators. Every operation derives a
//! cache key, probes the TTL cache, and only on a miss goes upstream through
//! the retry layer, writing the result back with an operation-specific TTL.

use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::cache::key;
use crate::cache::{CacheStats, TtlCache};
use crate::config::{
    CacheConfig, EXISTS_TTL, MANIFEST_TTL, RETRY_BASE_DELAY, RETRY_MAX_ATTEMPTS, SEARCH_TTL,
    VERSIONS_TTL,
};
use crate::error::Error;
use crate::registry::{ArtifactRegistry, SearchHit, SourceHost};
use crate::retry::with_retry;
use crate::version::compare::is_pre_release;
use crate::version::specifier::VersionSpecifier;

static COORDINATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("coordinate pattern is valid"));

/// All cached operation results share one bounded store, distinguished by
/// key prefix.
#[derive(Debug, Clone)]
enum CacheValue {
    Exists(bool),
    Versions(Vec<String>),
    Manifest(String),
    Search(Vec<SearchHit>),
}

pub struct MetadataResolver {
    registry: Arc<dyn ArtifactRegistry>,
    source_host: Option<Arc<dyn SourceHost>>,
    cache: TtlCache<CacheValue>,
}

impl MetadataResolver {
    /// The cache and clients are constructed by the caller and injected;
    /// there is no process-wide shared state.
    pub fn new(registry: Arc<dyn ArtifactRegistry>, cache_config: &CacheConfig) -> Self {
        Self {
            registry,
            source_host: None,
            cache: TtlCache::new(cache_config),
        }
    }

    /// Attaches an optional source host for README fallback lookups.
    pub fn with_source_host(mut self, source_host: Arc<dyn SourceHost>) -> Self {
        self.source_host = Some(source_host);
        self
    }

    fn validate_coordinate(group_id: &str, artifact_id: &str) -> Result<(), Error> {
        if !COORDINATE_PATTERN.is_match(group_id) {
            return Err(Error::InvalidInput(format!("invalid groupId: '{group_id}'")));
        }
        if !COORDINATE_PATTERN.is_match(artifact_id) {
            return Err(Error::InvalidInput(format!(
                "invalid artifactId: '{artifact_id}'"
            )));
        }
        Ok(())
    }

    /// Whether any artifact exists at the coordinate. Cached for 30 minutes.
    pub async fn exists_package(&self, group_id: &str, artifact_id: &str) -> Result<bool, Error> {
        Self::validate_coordinate(group_id, artifact_id)?;

        let cache_key = key::exists_key(group_id, artifact_id);
        if let Some(CacheValue::Exists(exists)) = self.cache.get(&cache_key) {
            debug!("Cache hit: {cache_key}");
            return Ok(exists);
        }

        let context = format!("exists {group_id}:{artifact_id}");
        let exists = with_retry(
            || self.registry.exists_package(group_id, artifact_id),
            RETRY_MAX_ATTEMPTS,
            RETRY_BASE_DELAY,
            &context,
        )
        .await?;

        self.cache
            .set(cache_key, CacheValue::Exists(exists), Some(EXISTS_TTL));
        Ok(exists)
    }

    /// All known versions, newest first. Cached for 30 minutes.
    pub async fn get_available_versions(
        &self,
        group_id: &str,
        artifact_id: &str,
    ) -> Result<Vec<String>, Error> {
        Self::validate_coordinate(group_id, artifact_id)?;
        self.versions(group_id, artifact_id).await
    }

    /// Resolves a specifier (`latest`, exact, or range) to one member of the
    /// coordinate's known-version set.
    pub async fn resolve_version(
        &self,
        group_id: &str,
        artifact_id: &str,
        specifier: &str,
    ) -> Result<String, Error> {
        Self::validate_coordinate(group_id, artifact_id)?;

        let parsed = VersionSpecifier::parse(specifier);
        let versions = self.versions(group_id, artifact_id).await?;

        let resolved = match &parsed {
            // The upstream listing is recency-sorted, so "latest" is the head
            VersionSpecifier::Latest => versions.first().cloned(),
            VersionSpecifier::Exact(version) => versions.contains(version).then(|| version.clone()),
            VersionSpecifier::Range(range) => {
                versions.iter().find(|v| range.matches(v)).cloned()
            }
        };

        resolved.ok_or_else(|| {
            Error::version_not_found(group_id, artifact_id, &parsed.to_string())
        })
    }

    /// Highest version without a pre-release keyword, falling back to the
    /// newest version overall when every entry is a pre-release.
    pub async fn get_latest_stable_version(
        &self,
        group_id: &str,
        artifact_id: &str,
    ) -> Result<String, Error> {
        Self::validate_coordinate(group_id, artifact_id)?;

        let versions = self.versions(group_id, artifact_id).await?;

        versions
            .iter()
            .find(|v| !is_pre_release(v))
            .or_else(|| versions.first())
            .cloned()
            .ok_or_else(|| Error::version_not_found(group_id, artifact_id, "latest"))
    }

    /// Manifest snapshot for a version specifier (absent means latest).
    /// Cached for 1 hour under the requested specifier.
    pub async fn get_manifest(
        &self,
        group_id: &str,
        artifact_id: &str,
        version: Option<&str>,
    ) -> Result<String, Error> {
        Self::validate_coordinate(group_id, artifact_id)?;

        let cache_key = key::manifest_key(group_id, artifact_id, version);
        if let Some(CacheValue::Manifest(manifest)) = self.cache.get(&cache_key) {
            debug!("Cache hit: {cache_key}");
            return Ok(manifest);
        }

        let resolved = self
            .resolve_version(group_id, artifact_id, version.unwrap_or("latest"))
            .await?;

        let context = format!("manifest {group_id}:{artifact_id}:{resolved}");
        let manifest = with_retry(
            || self.registry.fetch_manifest(group_id, artifact_id, &resolved),
            RETRY_MAX_ATTEMPTS,
            RETRY_BASE_DELAY,
            &context,
        )
        .await?;

        self.cache.set(
            cache_key,
            CacheValue::Manifest(manifest.clone()),
            Some(MANIFEST_TTL),
        );
        Ok(manifest)
    }

    /// Free-text search ordered by a weighted blend of upstream rank and
    /// version count. Cached for 5 minutes per parameter combination.
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
        relevance_weight: f64,
        popularity_weight: f64,
    ) -> Result<Vec<SearchHit>, Error> {
        if query.trim().is_empty() {
            return Err(Error::InvalidInput("empty search query".to_string()));
        }
        if limit == 0 {
            return Err(Error::InvalidInput("search limit must be positive".to_string()));
        }
        if !(relevance_weight >= 0.0 && popularity_weight >= 0.0) {
            return Err(Error::InvalidInput(
                "search weights must be non-negative".to_string(),
            ));
        }

        let cache_key = key::search_key(query, limit, relevance_weight, popularity_weight);
        if let Some(CacheValue::Search(hits)) = self.cache.get(&cache_key) {
            debug!("Cache hit: {cache_key}");
            return Ok(hits);
        }

        let context = format!("search '{query}'");
        let mut hits = with_retry(
            || self.registry.search(query, limit),
            RETRY_MAX_ATTEMPTS,
            RETRY_BASE_DELAY,
            &context,
        )
        .await?;

        rank_hits(&mut hits, relevance_weight, popularity_weight);

        self.cache
            .set(cache_key, CacheValue::Search(hits.clone()), Some(SEARCH_TTL));
        Ok(hits)
    }

    /// Best-effort README lookup through the optional source host. Absent
    /// host, missing repo, and transport failures all come back as `None`.
    pub async fn get_readme(&self, owner: &str, repo: &str) -> Option<String> {
        let source_host = self.source_host.as_ref()?;

        let context = format!("readme {owner}/{repo}");
        match with_retry(
            || source_host.fetch_readme(owner, repo),
            RETRY_MAX_ATTEMPTS,
            RETRY_BASE_DELAY,
            &context,
        )
        .await
        {
            Ok(readme) => Some(readme),
            Err(err) => {
                warn!("README lookup failed for {owner}/{repo}: {err}");
                None
            }
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    async fn versions(&self, group_id: &str, artifact_id: &str) -> Result<Vec<String>, Error> {
        let cache_key = key::versions_key(group_id, artifact_id);
        if let Some(CacheValue::Versions(versions)) = self.cache.get(&cache_key) {
            debug!("Cache hit: {cache_key}");
            return Ok(versions);
        }

        let context = format!("list_versions {group_id}:{artifact_id}");
        let versions = with_retry(
            || self.registry.list_versions(group_id, artifact_id),
            RETRY_MAX_ATTEMPTS,
            RETRY_BASE_DELAY,
            &context,
        )
        .await?;

        self.cache.set(
            cache_key,
            CacheValue::Versions(versions.clone()),
            Some(VERSIONS_TTL),
        );
        Ok(versions)
    }
}

/// Stable descending sort by `relevance_weight / (rank + 1) +
/// popularity_weight * version_count / max_count`; ties keep upstream order.
fn rank_hits(hits: &mut [SearchHit], relevance_weight: f64, popularity_weight: f64) {
    let max_count = hits.iter().map(|h| h.version_count).max().unwrap_or(0).max(1) as f64;

    let scored: Vec<f64> = hits
        .iter()
        .enumerate()
        .map(|(rank, hit)| {
            relevance_weight / (rank as f64 + 1.0)
                + popularity_weight * (hit.version_count as f64 / max_count)
        })
        .collect();

    let mut order: Vec<usize> = (0..hits.len()).collect();
    order.sort_by(|&a, &b| scored[b].total_cmp(&scored[a]));

    let reordered: Vec<SearchHit> = order.into_iter().map(|i| hits[i].clone()).collect();
    hits.clone_from_slice(&reordered);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{MockArtifactRegistry, MockSourceHost};
    use std::time::Duration;

    fn small_cache() -> CacheConfig {
        CacheConfig {
            default_ttl: Duration::from_secs(60),
            max_entries: 100,
        }
    }

    fn resolver_with(registry: MockArtifactRegistry) -> MetadataResolver {
        MetadataResolver::new(Arc::new(registry), &small_cache())
    }

    fn descending(versions: &[&str]) -> Vec<String> {
        versions.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn resolve_latest_returns_head_of_recency_sorted_list() {
        let mut registry = MockArtifactRegistry::new();
        registry
            .expect_list_versions()
            .times(1)
            .returning(|_, _| Ok(vec!["2.1.0".to_string(), "2.0.0".to_string()]));

        let resolver = resolver_with(registry);
        let version = resolver
            .resolve_version("org.example", "widget", "latest")
            .await
            .unwrap();

        assert_eq!(version, "2.1.0");
    }

    #[tokio::test]
    async fn resolve_exact_verifies_membership() {
        let mut registry = MockArtifactRegistry::new();
        registry
            .expect_list_versions()
            .returning(|_, _| Ok(descending(&["2.1.0", "2.0.0", "1.9.0"])));

        let resolver = resolver_with(registry);
        let version = resolver
            .resolve_version("org.example", "widget", "2.0.0")
            .await
            .unwrap();

        assert_eq!(version, "2.0.0");
    }

    #[tokio::test]
    async fn resolve_missing_exact_fails_with_version_not_found() {
        let mut registry = MockArtifactRegistry::new();
        registry
            .expect_list_versions()
            .returning(|_, _| Ok(descending(&["2.1.0", "2.0.0"])));

        let resolver = resolver_with(registry);
        let err = resolver
            .resolve_version("group", "artifact", "9.9.9")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::VersionNotFound { ref coordinate, ref specifier }
                if coordinate == "group:artifact" && specifier == "9.9.9"
        ));
    }

    #[tokio::test]
    async fn resolve_range_picks_highest_match() {
        let mut registry = MockArtifactRegistry::new();
        registry.expect_list_versions().returning(|_, _| {
            Ok(descending(&[
                "2.1.0", "2.0.0", "1.9.0", "1.8.0", "1.5.0", "1.4.0",
            ]))
        });

        let resolver = resolver_with(registry);
        let version = resolver
            .resolve_version("org.example", "widget", "[1.5,2.0)")
            .await
            .unwrap();

        assert_eq!(version, "1.9.0");
    }

    #[tokio::test]
    async fn resolve_unsatisfiable_range_names_the_range() {
        let mut registry = MockArtifactRegistry::new();
        registry
            .expect_list_versions()
            .returning(|_, _| Ok(descending(&["1.0.0"])));

        let resolver = resolver_with(registry);
        let err = resolver
            .resolve_version("org.example", "widget", "[5.0,6.0)")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::VersionNotFound { ref specifier, .. } if specifier == "[5.0,6.0)"
        ));
    }

    #[tokio::test]
    async fn latest_stable_skips_pre_releases() {
        let mut registry = MockArtifactRegistry::new();
        registry.expect_list_versions().returning(|_, _| {
            Ok(descending(&[
                "2.0.0-SNAPSHOT",
                "1.9.0-rc1",
                "1.8.0",
                "1.7.0-beta",
            ]))
        });

        let resolver = resolver_with(registry);
        let version = resolver
            .get_latest_stable_version("org.example", "widget")
            .await
            .unwrap();

        assert_eq!(version, "1.8.0");
    }

    #[tokio::test]
    async fn latest_stable_falls_back_to_newest_when_all_are_pre_release() {
        let mut registry = MockArtifactRegistry::new();
        registry
            .expect_list_versions()
            .returning(|_, _| Ok(descending(&["2.0.0-beta", "1.9.0-alpha"])));

        let resolver = resolver_with(registry);
        let version = resolver
            .get_latest_stable_version("org.example", "widget")
            .await
            .unwrap();

        assert_eq!(version, "2.0.0-beta");
    }

    #[tokio::test]
    async fn version_list_is_fetched_once_then_served_from_cache() {
        let mut registry = MockArtifactRegistry::new();
        registry
            .expect_list_versions()
            .times(1)
            .returning(|_, _| Ok(descending(&["2.1.0", "2.0.0"])));

        let resolver = resolver_with(registry);

        let first = resolver
            .get_available_versions("org.example", "widget")
            .await
            .unwrap();
        let second = resolver
            .get_available_versions("org.example", "widget")
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(resolver.cache_stats().size, 1);
    }

    #[tokio::test]
    async fn invalid_coordinate_never_reaches_the_registry() {
        let registry = MockArtifactRegistry::new(); // would panic on any call

        let resolver = resolver_with(registry);
        let err = resolver
            .resolve_version("org example", "widget", "latest")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(resolver.cache_stats().size, 0);
    }

    #[tokio::test]
    async fn exists_package_caches_the_answer() {
        let mut registry = MockArtifactRegistry::new();
        registry
            .expect_exists_package()
            .times(1)
            .returning(|_, _| Ok(true));

        let resolver = resolver_with(registry);

        assert!(resolver.exists_package("org.junit", "junit").await.unwrap());
        assert!(resolver.exists_package("org.junit", "junit").await.unwrap());
    }

    #[tokio::test]
    async fn manifest_for_absent_version_resolves_latest_first() {
        let mut registry = MockArtifactRegistry::new();
        registry
            .expect_list_versions()
            .times(1)
            .returning(|_, _| Ok(descending(&["2.1.0", "2.0.0"])));
        registry
            .expect_fetch_manifest()
            .times(1)
            .withf(|_, _, version| version == "2.1.0")
            .returning(|_, _, _| Ok("<project/>".to_string()));

        let resolver = resolver_with(registry);
        let manifest = resolver
            .get_manifest("org.example", "widget", None)
            .await
            .unwrap();

        assert_eq!(manifest, "<project/>");

        // Second call is a pure cache hit
        let again = resolver
            .get_manifest("org.example", "widget", None)
            .await
            .unwrap();
        assert_eq!(again, "<project/>");
    }

    #[tokio::test]
    async fn search_rejects_degenerate_input() {
        let registry = MockArtifactRegistry::new();
        let resolver = resolver_with(registry);

        assert!(matches!(
            resolver.search("  ", 10, 0.8, 0.6).await,
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            resolver.search("junit", 0, 0.8, 0.6).await,
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            resolver.search("junit", 10, -1.0, 0.6).await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn search_caches_per_parameter_combination() {
        fn hit(artifact: &str, count: u64) -> SearchHit {
            SearchHit {
                group_id: "org.example".to_string(),
                artifact_id: artifact.to_string(),
                latest_version: "1.0.0".to_string(),
                version_count: count,
                timestamp: 0,
            }
        }

        let mut registry = MockArtifactRegistry::new();
        registry
            .expect_search()
            .times(2)
            .returning(|_, _| Ok(vec![hit("widget", 5), hit("gadget", 50)]));

        let resolver = resolver_with(registry);

        let first = resolver.search("widget", 10, 0.8, 0.6).await.unwrap();
        let cached = resolver.search("widget", 10, 0.8, 0.6).await.unwrap();
        assert_eq!(first, cached);

        // A different limit is a different key, so the registry is hit again
        resolver.search("widget", 20, 0.8, 0.6).await.unwrap();
    }

    #[tokio::test]
    async fn search_popularity_weight_can_outrank_upstream_order() {
        fn hit(artifact: &str, count: u64) -> SearchHit {
            SearchHit {
                group_id: "org.example".to_string(),
                artifact_id: artifact.to_string(),
                latest_version: "1.0.0".to_string(),
                version_count: count,
                timestamp: 0,
            }
        }

        let mut registry = MockArtifactRegistry::new();
        registry
            .expect_search()
            .returning(|_, _| Ok(vec![hit("obscure", 1), hit("popular", 100)]));

        let resolver = resolver_with(registry);
        let hits = resolver.search("widget", 10, 0.0, 1.0).await.unwrap();

        assert_eq!(hits[0].artifact_id, "popular");
    }

    #[tokio::test]
    async fn readme_is_none_without_a_source_host() {
        let resolver = resolver_with(MockArtifactRegistry::new());
        assert_eq!(resolver.get_readme("owner", "repo").await, None);
    }

    #[tokio::test]
    async fn readme_failures_degrade_to_none() {
        let mut source_host = MockSourceHost::new();
        source_host
            .expect_fetch_readme()
            .returning(|_, _| Err(Error::NotFound("owner/repo".to_string())));

        let resolver = resolver_with(MockArtifactRegistry::new())
            .with_source_host(Arc::new(source_host));

        assert_eq!(resolver.get_readme("owner", "repo").await, None);
    }

    #[tokio::test]
    async fn readme_success_passes_content_through() {
        let mut source_host = MockSourceHost::new();
        source_host
            .expect_fetch_readme()
            .returning(|_, _| Ok("# Widget".to_string()));

        let resolver = resolver_with(MockArtifactRegistry::new())
            .with_source_host(Arc::new(source_host));

        assert_eq!(
            resolver.get_readme("owner", "repo").await,
            Some("# Widget".to_string())
        );
    }
}
