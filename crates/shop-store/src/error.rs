//! # Store Error Types
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         StoreError                                      │
//! │                                                                         │
//! │  Remote(RemoteError)            retryable if the API was unreachable    │
//! │  LocalStorage(LocalError)       persistence lost, session continues     │
//! │  MalformedRemoteCollection      load treats the collection as empty     │
//! │  MergeInterrupted               local bucket holds what was not pushed  │
//! │  MoveIncomplete                 item is in the cart and the wishlist    │
//! │  NotReady / NotAuthenticated    caller used the store out of order      │
//! │  Core(CoreError)                business rule violation                 │
//! │  InvalidConfig / ConfigLoad...  shop.toml problems                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use shop_core::{CollectionKind, CoreError};
use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Remote API Errors
// =============================================================================

/// Failures talking to the remote cart/wishlist API.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Connection refused, DNS failure, reset, or the API marked offline.
    #[error("Remote API unavailable: {0}")]
    Unavailable(String),

    /// No response within the configured timeout.
    #[error("Remote API timed out")]
    Timeout,

    /// The API answered with a non-success status.
    #[error("Remote API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not valid JSON.
    #[error("Remote API response could not be decoded: {0}")]
    Decode(String),

    /// Base URL or path could not be built.
    #[error("Invalid remote URL: {0}")]
    InvalidUrl(String),
}

impl RemoteError {
    /// Returns true if retrying the same request could succeed.
    ///
    /// ## Retryable
    /// - Unreachable API and timeouts
    /// - 408, 429 and 5xx responses
    pub fn is_retryable(&self) -> bool {
        match self {
            RemoteError::Unavailable(_) | RemoteError::Timeout => true,
            RemoteError::Status { status, .. } => *status == 408 || *status == 429 || *status >= 500,
            RemoteError::Decode(_) | RemoteError::InvalidUrl(_) => false,
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RemoteError::Timeout
        } else if err.is_decode() {
            RemoteError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            RemoteError::Status {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else if err.is_builder() {
            RemoteError::InvalidUrl(err.to_string())
        } else {
            RemoteError::Unavailable(err.to_string())
        }
    }
}

// =============================================================================
// Local Storage Errors
// =============================================================================

/// Failures reading or writing the local key-value store.
#[derive(Debug, Error)]
pub enum LocalError {
    #[error("Local storage unavailable: {0}")]
    Unavailable(String),

    /// Stored value is not a JSON array of items.
    #[error("Local storage value under '{key}' is corrupt: {reason}")]
    Corrupt { key: String, reason: String },
}

impl From<shop_db::DbError> for LocalError {
    fn from(err: shop_db::DbError) -> Self {
        LocalError::Unavailable(err.to_string())
    }
}

// =============================================================================
// Store Error
// =============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    // =========================================================================
    // Persistence Errors
    // =========================================================================
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    LocalStorage(#[from] LocalError),

    /// Remote payload for a collection was not a JSON array.
    #[error("Remote {kind} payload is malformed: {reason}")]
    MalformedRemoteCollection { kind: CollectionKind, reason: String },

    /// A remote add failed partway through the sign-in merge.
    #[error("Sign-in merge of {kind} stopped after {pushed} item(s), {remaining} left to push: {source}")]
    MergeInterrupted {
        kind: CollectionKind,
        pushed: usize,
        remaining: usize,
        #[source]
        source: RemoteError,
    },

    /// `move_to_cart` added the cart line but could not drop the wishlist
    /// entry. Removing the entry again finishes the move.
    #[error("{product_id} was added to the cart but is still on the wishlist: {source}")]
    MoveIncomplete {
        product_id: String,
        #[source]
        source: Box<StoreError>,
    },

    // =========================================================================
    // Usage Errors
    // =========================================================================
    /// Mutation attempted before the initial load finished.
    #[error("The {kind} is still loading")]
    NotReady { kind: CollectionKind },

    /// Operation needs a signed-in account.
    #[error("No account is signed in")]
    NotAuthenticated,

    #[error(transparent)]
    Core(#[from] CoreError),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Returns true if the UI should offer a retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Remote(e) => e.is_retryable(),
            StoreError::MergeInterrupted { source, .. } => source.is_retryable(),
            StoreError::MoveIncomplete { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            StoreError::InvalidConfig(_)
                | StoreError::ConfigLoadFailed(_)
                | StoreError::ConfigSaveFailed(_)
        )
    }
}

impl From<shop_core::ValidationError> for StoreError {
    fn from(err: shop_core::ValidationError) -> Self {
        StoreError::Core(CoreError::Validation(err))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<shop_db::DbError> for StoreError {
    fn from(err: shop_db::DbError) -> Self {
        StoreError::LocalStorage(err.into())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for StoreError {
    fn from(err: toml::de::Error) -> Self {
        StoreError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for StoreError {
    fn from(err: toml::ser::Error) -> Self {
        StoreError::ConfigSaveFailed(err.to_string())
    }
}
