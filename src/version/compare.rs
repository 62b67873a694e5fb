//! Simplified Maven version comparison
//!
//! Versions are split into a numeric-dot prefix and a trailing suffix.
//! Numeric components are compared pairwise with zero padding, so
//! `1.0` == `1.0.0`. On a tie, a release (no suffix) outranks any suffixed
//! build and suffixes compare as plain strings. Deliberately NOT full
//! semantic-versioning precedence; existing callers depend on this exact
//! ordering, so do not swap in a semver library here.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

static VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)*)(.*)$").expect("version pattern is valid"));

/// Keywords marking a version as a pre-release, matched case-insensitively
/// anywhere in the string.
const PRERELEASE_KEYWORDS: &[&str] = &[
    "alpha",
    "beta",
    "rc",
    "snapshot",
    "milestone",
    "cr",
    "pr",
    "dev",
    "preview",
    "early",
    "experimental",
];

/// Numeric-dot prefix plus trailing suffix, used only during comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedVersion {
    pub components: Vec<u64>,
    pub suffix: String,
}

impl ParsedVersion {
    /// Splits a version into numeric components and suffix.
    ///
    /// A string with no leading digits parses to components `[0]` with the
    /// whole input as suffix, so it still participates in the total order.
    pub fn parse(version: &str) -> Self {
        let Some(captures) = VERSION_PATTERN.captures(version) else {
            return Self {
                components: vec![0],
                suffix: version.to_string(),
            };
        };

        let components = captures[1]
            .split('.')
            // Components longer than u64 saturate rather than fail the parse
            .map(|part| part.parse::<u64>().unwrap_or(u64::MAX))
            .collect();

        Self {
            components,
            suffix: captures[2].to_string(),
        }
    }
}

/// Total order over the [`ParsedVersion`] projection of two version strings.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a = ParsedVersion::parse(a);
    let b = ParsedVersion::parse(b);

    let len = a.components.len().max(b.components.len());
    for i in 0..len {
        let left = a.components.get(i).copied().unwrap_or(0);
        let right = b.components.get(i).copied().unwrap_or(0);
        match left.cmp(&right) {
            Ordering::Equal => {}
            other => return other,
        }
    }

    match (a.suffix.is_empty(), b.suffix.is_empty()) {
        (true, true) => Ordering::Equal,
        // A release always outranks a suffixed build on the same numbers
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.suffix.cmp(&b.suffix),
    }
}

/// Whether `version` carries a pre-release keyword.
pub fn is_pre_release(version: &str) -> bool {
    let lowered = version.to_lowercase();
    PRERELEASE_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.2.3", vec![1, 2, 3], "")]
    #[case("1.0", vec![1, 0], "")]
    #[case("5.10.0-RC1", vec![5, 10, 0], "-RC1")]
    #[case("2.0.0.Final", vec![2, 0, 0], ".Final")]
    #[case("unknown", vec![0], "unknown")]
    #[case("", vec![0], "")]
    fn parse_splits_numeric_prefix_and_suffix(
        #[case] input: &str,
        #[case] components: Vec<u64>,
        #[case] suffix: &str,
    ) {
        let parsed = ParsedVersion::parse(input);
        assert_eq!(parsed.components, components);
        assert_eq!(parsed.suffix, suffix);
    }

    #[rstest]
    #[case("1.0", "1.0.0", Ordering::Equal)]
    #[case("1.0.1", "1.0", Ordering::Greater)]
    #[case("1.9.0", "1.10.0", Ordering::Less)]
    #[case("2.0.0", "1.99.99", Ordering::Greater)]
    #[case("1.0.0", "1.0.0-beta", Ordering::Greater)] // release beats pre-release
    #[case("1.0.0-alpha", "1.0.0-beta", Ordering::Less)] // plain lexicographic
    #[case("1.0.0-RC1", "1.0.0-RC2", Ordering::Less)]
    #[case("abc", "abd", Ordering::Less)] // no leading digits
    fn compare_orders_versions(#[case] a: &str, #[case] b: &str, #[case] expected: Ordering) {
        assert_eq!(compare_versions(a, b), expected);
    }

    #[test]
    fn compare_is_antisymmetric() {
        let versions = ["1.0", "1.0.0", "1.0.1", "1.0.0-beta", "2.0", "abc"];
        for a in versions {
            for b in versions {
                assert_eq!(
                    compare_versions(a, b),
                    compare_versions(b, a).reverse(),
                    "compare({a}, {b}) must mirror compare({b}, {a})"
                );
            }
        }
    }

    #[rstest]
    #[case("1.0.0-alpha", true)]
    #[case("2.0.0-SNAPSHOT", true)]
    #[case("5.0.0.RC1", true)]
    #[case("1.0.0-Milestone2", true)]
    #[case("3.0.0-preview.1", true)]
    #[case("1.0.0", false)]
    #[case("2.31.0.Final", false)]
    fn pre_release_detection_matches_keywords(#[case] version: &str, #[case] expected: bool) {
        assert_eq!(is_pre_release(version), expected);
    }
}
