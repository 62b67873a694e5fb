//! Version specifier classification and range matching
//!
//! A specifier string is parsed exactly once into one of three shapes:
//! `latest` (or empty), an exact version, or a Maven-style range such as
//! `[1.5,2.0)`. Anything else is treated literally and verified against the
//! known-version set, so classification never fails.

use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::version::compare::compare_versions;

static EXACT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]+(\.[0-9]+)*(-[a-zA-Z0-9.-]+)?$").expect("exact pattern is valid")
});

/// One edge of a version range. An absent value leaves that side unbounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeBound {
    pub value: Option<String>,
    pub inclusive: bool,
}

/// A parsed range with its original text preserved for error reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    pub lower: RangeBound,
    pub upper: RangeBound,
    raw: String,
}

impl VersionRange {
    /// Whether `candidate` satisfies both bounds, respecting inclusivity.
    /// A fully open range (`[,]` / `(,)`) matches every version.
    pub fn matches(&self, candidate: &str) -> bool {
        if let Some(lower) = &self.lower.value {
            let cmp = compare_versions(candidate, lower);
            let ok = if self.lower.inclusive {
                cmp != Ordering::Less
            } else {
                cmp == Ordering::Greater
            };
            if !ok {
                return false;
            }
        }

        if let Some(upper) = &self.upper.value {
            let cmp = compare_versions(candidate, upper);
            let ok = if self.upper.inclusive {
                cmp != Ordering::Greater
            } else {
                cmp == Ordering::Less
            };
            if !ok {
                return false;
            }
        }

        true
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A specifier is exactly one of these, decided by fixed syntactic patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSpecifier {
    /// `"latest"` or an empty string
    Latest,
    /// A concrete version to verify against the known-version set. Strings
    /// matching no other pattern land here and are checked literally.
    Exact(String),
    /// A bracketed mathematical range over versions
    Range(VersionRange),
}

impl VersionSpecifier {
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();

        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("latest") {
            return VersionSpecifier::Latest;
        }

        if is_range_shaped(trimmed) {
            return VersionSpecifier::Range(parse_range(trimmed));
        }

        // Both the exact pattern and the literal fallback resolve the same
        // way, by membership in the known-version set.
        VersionSpecifier::Exact(trimmed.to_string())
    }

    /// Whether the string looks like a plain version rather than a fallback
    /// literal. Resolution treats both identically; callers that validate
    /// input up front can use this to warn early.
    pub fn is_exact_syntax(version: &str) -> bool {
        EXACT_PATTERN.is_match(version)
    }
}

impl fmt::Display for VersionSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSpecifier::Latest => f.write_str("latest"),
            VersionSpecifier::Exact(version) => f.write_str(version),
            VersionSpecifier::Range(range) => write!(f, "{range}"),
        }
    }
}

fn is_range_shaped(input: &str) -> bool {
    (input.starts_with('[') || input.starts_with('('))
        && (input.ends_with(']') || input.ends_with(')'))
        && input.len() >= 2
}

fn parse_range(input: &str) -> VersionRange {
    let lower_inclusive = input.starts_with('[');
    let upper_inclusive = input.ends_with(']');

    let inner = &input[1..input.len() - 1];
    let (lower_text, upper_text) = match inner.split_once(',') {
        Some((lower, upper)) => (lower, upper),
        None => (inner, ""),
    };

    let bound = |text: &str, inclusive: bool| RangeBound {
        value: {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        },
        inclusive,
    };

    VersionRange {
        lower: bound(lower_text, lower_inclusive),
        upper: bound(upper_text, upper_inclusive),
        raw: input.to_string(),
    }
}
