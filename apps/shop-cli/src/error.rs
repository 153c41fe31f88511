//! # API Error Type
//!
//! Unified error type for CLI commands. Every failure is printed to stdout
//! as one JSON object and the process exits with status 1.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  command ──► Result<Value, ApiError>                                    │
//! │                   │                                                     │
//! │                   ├── CoreError  (validation, limits, empty cart)      │
//! │                   ├── StoreError (remote, local storage, merge)        │
//! │                   └── DbError    (opening local storage)               │
//! │                   │                                                     │
//! │                   ▼                                                     │
//! │  { "code": "REMOTE_UNAVAILABLE",                                        │
//! │    "message": "Remote API unavailable: ...",                            │
//! │    "retryable": true }                                                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use shop_core::CoreError;
use shop_db::DbError;
use shop_store::{RemoteError, StoreError};

/// Error printed when a command fails.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Whether repeating the same command may succeed.
    pub retryable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Product not in the cart or wishlist
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Cart limits or empty checkout
    CartError,

    /// Remote API unreachable or returned a server error
    RemoteUnavailable,

    /// Remote API rejected the request or sent garbage
    RemoteError,

    /// Sign-in merge stopped partway; signing in again resumes it
    MergeInterrupted,

    /// Move-to-cart added the line but left the wishlist entry
    MoveIncomplete,

    /// Local storage could not be opened or read
    StorageError,

    /// Configuration missing or invalid
    ConfigError,

    /// Command needs `--account`
    NotAuthenticated,

    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ConfigError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ItemNotFound(id) => {
                ApiError::new(ErrorCode::NotFound, format!("Product not found: {}", id))
            }
            CoreError::CartTooLarge { .. } | CoreError::EmptyCart => {
                ApiError::new(ErrorCode::CartError, err.to_string())
            }
            CoreError::QuantityTooLarge { .. } => ApiError::validation(err.to_string()),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<RemoteError> for ApiError {
    fn from(err: RemoteError) -> Self {
        let code = if err.is_retryable() {
            ErrorCode::RemoteUnavailable
        } else {
            ErrorCode::RemoteError
        };
        ApiError::new(code, err.to_string()).retryable(err.is_retryable())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        let retryable = err.is_retryable();

        match err {
            StoreError::Remote(e) => e.into(),
            StoreError::LocalStorage(e) => ApiError::new(ErrorCode::StorageError, e.to_string()),
            StoreError::MalformedRemoteCollection { .. } => {
                ApiError::new(ErrorCode::RemoteError, err.to_string())
            }
            StoreError::MergeInterrupted { .. } => {
                ApiError::new(ErrorCode::MergeInterrupted, err.to_string()).retryable(retryable)
            }
            StoreError::MoveIncomplete { .. } => {
                ApiError::new(ErrorCode::MoveIncomplete, err.to_string()).retryable(retryable)
            }
            StoreError::NotReady { .. } => ApiError::internal(err.to_string()),
            StoreError::NotAuthenticated => {
                ApiError::new(ErrorCode::NotAuthenticated, "Pass --account to sign in")
            }
            StoreError::Core(e) => e.into(),
            StoreError::InvalidConfig(_)
            | StoreError::ConfigLoadFailed(_)
            | StoreError::ConfigSaveFailed(_) => ApiError::config(err.to_string()),
            StoreError::Serialization(e) => {
                tracing::error!("Serialization failed: {}", e);
                ApiError::internal("Serialization failed")
            }
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::QueryFailed(e) | DbError::Internal(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Local storage query failed: {}", e);
                ApiError::new(ErrorCode::StorageError, "Local storage operation failed")
            }
            other => ApiError::new(ErrorCode::StorageError, other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::internal(format!("Could not encode output: {}", err))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_core::CollectionKind;

    #[test]
    fn test_error_code_serialization() {
        let err = ApiError::new(ErrorCode::RemoteUnavailable, "offline").retryable(true);
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["code"], "REMOTE_UNAVAILABLE");
        assert_eq!(json["message"], "offline");
        assert_eq!(json["retryable"], true);
    }

    #[test]
    fn test_store_error_mapping() {
        let err: ApiError = StoreError::Core(CoreError::ItemNotFound("p-1".into())).into();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err: ApiError = StoreError::Remote(RemoteError::Status {
            status: 400,
            body: "bad".into(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::RemoteError);
        assert!(!err.retryable);

        let err: ApiError = StoreError::MergeInterrupted {
            kind: CollectionKind::Cart,
            pushed: 1,
            remaining: 2,
            source: RemoteError::Timeout,
        }
        .into();
        assert_eq!(err.code, ErrorCode::MergeInterrupted);
        assert!(err.retryable);

        let err: ApiError = StoreError::MoveIncomplete {
            product_id: "w-1".into(),
            source: Box::new(StoreError::Remote(RemoteError::Timeout)),
        }
        .into();
        assert_eq!(err.code, ErrorCode::MoveIncomplete);
        assert!(err.retryable);
    }
}
