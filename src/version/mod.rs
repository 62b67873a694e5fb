//! Version interpretation layer
//!
//! - [`compare`]: simplified Maven version ordering and pre-release detection
//! - [`specifier`]: specifier classification (latest / exact / range) and
//!   range matching

pub mod compare;
pub mod specifier;

pub use compare::{ParsedVersion, compare_versions, is_pre_release};
pub use specifier::{RangeBound, VersionRange, VersionSpecifier};
