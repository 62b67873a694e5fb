//! Cache key derivation
//!
//! Each cached operation gets a fixed prefix plus every parameter that
//! affects its result, joined by `:`. Identical parameter combinations must
//! always produce identical keys and distinct combinations must never
//! collide, so nothing position-dependent or lossy goes into a key.

use sha2::{Digest, Sha256};

/// Key for a package existence check.
pub fn exists_key(group_id: &str, artifact_id: &str) -> String {
    format!("exists:{group_id}:{artifact_id}")
}

/// Key for a package's version list.
pub fn versions_key(group_id: &str, artifact_id: &str) -> String {
    format!("versions:{group_id}:{artifact_id}")
}

/// Key for a resolved manifest snapshot. An absent version means the
/// caller wants whatever "latest" resolves to, and caches under that name.
pub fn manifest_key(group_id: &str, artifact_id: &str, version: Option<&str>) -> String {
    let version = version.unwrap_or("latest");
    format!("manifest:{group_id}:{artifact_id}:{version}")
}

/// Key for a search-result page.
///
/// Queries are arbitrary caller text, so the parameter tuple is folded
/// through a truncated SHA-256 to keep keys bounded. Content-derived only;
/// nothing here is a security boundary.
pub fn search_key(query: &str, limit: usize, relevance_weight: f64, popularity_weight: f64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(query.as_bytes());
    hasher.update([0]);
    hasher.update(limit.to_le_bytes());
    hasher.update(relevance_weight.to_le_bytes());
    hasher.update(popularity_weight.to_le_bytes());

    let digest = hex::encode(&hasher.finalize()[..8]);
    format!("search:{digest}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exists_and_versions_keys_never_collide_across_operations() {
        assert_ne!(
            exists_key("org.junit", "junit"),
            versions_key("org.junit", "junit")
        );
    }

    #[test]
    fn manifest_key_substitutes_latest_for_absent_version() {
        assert_eq!(
            manifest_key("org.junit", "junit", None),
            "manifest:org.junit:junit:latest"
        );
        assert_eq!(
            manifest_key("org.junit", "junit", Some("5.10.0")),
            "manifest:org.junit:junit:5.10.0"
        );
    }

    #[test]
    fn search_key_is_deterministic() {
        let a = search_key("spring boot", 10, 0.8, 0.6);
        let b = search_key("spring boot", 10, 0.8, 0.6);
        assert_eq!(a, b);
    }

    #[test]
    fn search_key_changes_when_any_parameter_changes() {
        let base = search_key("spring boot", 10, 0.8, 0.6);

        assert_ne!(base, search_key("spring data", 10, 0.8, 0.6));
        assert_ne!(base, search_key("spring boot", 20, 0.8, 0.6));
        assert_ne!(base, search_key("spring boot", 10, 0.9, 0.6));
        assert_ne!(base, search_key("spring boot", 10, 0.8, 0.7));
    }

    #[test]
    fn search_key_stays_bounded_for_long_queries() {
        let long_query = "a".repeat(10_000);
        let key = search_key(&long_query, 10, 0.8, 0.6);
        assert!(key.len() < 32);
    }
}
