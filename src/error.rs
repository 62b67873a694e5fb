use thiserror::Error;

/// Error taxonomy for metadata lookups.
///
/// The retry layer is the only place that classifies failures as retryable
/// or fatal; every other component produces or forwards these variants.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Package not found: {0}")]
    NotFound(String),

    #[error("No version matching '{specifier}' for {coordinate}")]
    VersionNotFound {
        coordinate: String,
        specifier: String,
    },

    #[error("Rate limited: retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Whether the retry layer may attempt this operation again.
    ///
    /// An HTTP-style status in [400, 500) other than 429 is a caller mistake
    /// and must fail fast. Everything transport-shaped is worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::NotFound(_) => false,
            Error::VersionNotFound { .. } => false,
            Error::InvalidInput(_) => false,
            Error::RateLimited { .. } => true,
            Error::Network(_) => true,
            Error::UnexpectedStatus { status, .. } => {
                !(400..500).contains(status) || *status == 429
            }
        }
    }

    /// Build a `VersionNotFound` for a `(group, artifact)` coordinate.
    pub fn version_not_found(group_id: &str, artifact_id: &str, specifier: &str) -> Self {
        Error::VersionNotFound {
            coordinate: format!("{group_id}:{artifact_id}"),
            specifier: specifier.to_string(),
        }
    }
}
