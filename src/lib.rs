//! Metadata-lookup service for Maven-style artifact repositories
//!
//! Resolves version specifiers against an upstream registry, serves cached
//! manifest snapshots, and searches for artifacts. Every upstream call goes
//! through a bounded TTL cache and a retrying transport wrapper.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   caller    │────▶│  resolver   │────▶│  TTL cache  │
//! │ (CLI/tool)  │     │ (service)   │     │  (bounded)  │
//! └─────────────┘     └──────┬──────┘     └─────────────┘
//!                            │ miss
//!                     ┌──────▼──────┐     ┌─────────────┐
//!                     │    retry    │────▶│  registries │
//!                     │  (backoff)  │     │ (HTTP APIs) │
//!                     └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cache`]: bounded in-memory TTL cache and cache-key derivation
//! - [`retry`]: exponential-backoff retry around fallible upstream calls
//! - [`version`]: specifier classification and version comparison
//! - [`registry`]: collaborator traits ([`registry::ArtifactRegistry`],
//!   [`registry::SourceHost`])
//! - [`registries`]: concrete Maven Central and GitHub clients
//! - [`resolver`]: the cache-backed service tying it all together
//! - [`config`]: TTLs, retry policy, and env-tunable cache sizing
//! - [`error`]: the typed error taxonomy

pub mod cache;
pub mod config;
pub mod error;
pub mod registries;
pub mod registry;
pub mod resolver;
pub mod retry;
pub mod version;

pub use error::Error;
pub use resolver::MetadataResolver;
pub use version::is_pre_release;
