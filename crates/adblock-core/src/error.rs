use thiserror::Error;

/// Result type alias for ad-block operations
pub type Result<T> = std::result::Result<T, AdblockError>;

/// Errors that can occur while building or synchronizing the blocklist
#[derive(Error, Debug)]
pub enum AdblockError {
    /// Authentication failed - invalid or missing API token
    #[error("authentication failed: invalid API token or account id")]
    Unauthorized,

    /// Rate limit exceeded
    #[error("rate limit exceeded, retry after {retry_after:?} seconds")]
    RateLimited {
        /// Seconds to wait before retrying
        retry_after: Option<u64>,
    },

    /// Resource not found
    #[error("resource not found: {resource}")]
    NotFound {
        /// Description of the resource that wasn't found
        resource: String,
    },

    /// API returned an error response
    #[error("API error ({code}): {message}")]
    Api {
        /// HTTP status code (or the first envelope error code)
        code: u16,
        /// Error message from the API
        message: String,
    },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Request timed out
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Connection failed
    #[error("connection failed: {0}")]
    Connection(String),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// A source list could not be downloaded
    #[error("failed to fetch {url}: {reason}")]
    Fetch {
        /// Source URL
        url: String,
        /// Why the download failed
        reason: String,
    },

    /// More than one remote policy carries the managed prefix
    #[error("found {found} gateway policies matching {prefix:?}, expected at most one")]
    ConsistencyViolation {
        /// Policy name prefix that was searched for
        prefix: String,
        /// Number of matching policies
        found: usize,
    },

    /// Some chunk lists could not be created; the created ones were removed
    #[error("{failed} list chunk(s) failed to create, rolled back {rolled_back} of {created}")]
    PartialCreate {
        /// Chunks that failed
        failed: usize,
        /// Chunks that succeeded before rollback
        created: usize,
        /// Chunks successfully deleted during rollback
        rolled_back: usize,
    },

    /// The desired set is implausibly large
    #[error("desired set of {size} domains exceeds the safety ceiling of {limit}")]
    CeilingExceeded {
        /// Number of desired domains
        size: usize,
        /// Configured ceiling
        limit: usize,
    },

    /// Generic internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl AdblockError {
    /// Returns true if a single request may succeed when repeated
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Timeout(_) | Self::Connection(_) => true,
            Self::Api { code, .. } => *code >= 500,
            _ => false,
        }
    }

    /// Returns true if the error must terminate the process instead of being retried
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::CeilingExceeded { .. } | Self::Unauthorized | Self::Config(_)
        )
    }

    /// Returns the HTTP status code if this is an API error
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::RateLimited { .. } => Some(429),
            Self::NotFound { .. } => Some(404),
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}
