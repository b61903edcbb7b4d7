//! Error taxonomy for the petstore service.
//!
//! Every failure that crosses a layer boundary is one of four typed kinds,
//! each fixing a machine-readable code and an HTTP status:
//!
//! | Kind | code | status |
//! |---|---|---|
//! | `NotFound` | `NOT_FOUND` | 404 |
//! | `Validation` | `VALIDATION_ERROR` | 422 |
//! | `BadRequest` | `BAD_REQUEST` | 400 |
//! | `Internal` | `INTERNAL_ERROR` | 500 |
//!
//! Storage-layer errors never leak outward raw: the service layer classifies
//! them into one of these kinds at its boundary. There is deliberately no
//! `From<sqlx::Error>` here; classification is an explicit decision.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`ApiError`].
pub type ApiResult<T> = Result<T, ApiError>;

/// Standard error type for the petstore service.
///
/// # Example
///
/// ```
/// use petstore_core::ApiError;
///
/// fn check_name(name: &str) -> Result<(), ApiError> {
///     if name.trim().is_empty() {
///         return Err(ApiError::validation("Name must not be empty"));
///     }
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum ApiError {
    /// A referenced entity does not exist.
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
        /// Structured context (e.g. `{"id": 5}`).
        details: Option<serde_json::Value>,
    },

    /// A business-rule validation failed (duplicate name, invalid status,
    /// dangling reference, has-dependents).
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable error message.
        message: String,
        /// Structured context (e.g. `{"petCount": 3}`).
        details: Option<serde_json::Value>,
    },

    /// Malformed or out-of-range input caught before touching storage.
    #[error("Bad request: {message}")]
    BadRequest {
        /// Human-readable error message.
        message: String,
        /// Structured context (e.g. schema violation path/message).
        details: Option<serde_json::Value>,
    },

    /// Anything unclassified, including unexpected storage errors.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error. Logged server-side, never serialized.
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl ApiError {
    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            details: None,
        }
    }

    /// Creates a not-found error with structured context.
    #[must_use]
    pub fn not_found_with_details(
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self::NotFound {
            message: message.into(),
            details: Some(details),
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details: None,
        }
    }

    /// Creates a validation error with structured context.
    #[must_use]
    pub fn validation_with_details(
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self::Validation {
            message: message.into(),
            details: Some(details),
        }
    }

    /// Creates a bad-request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            details: None,
        }
    }

    /// Creates a bad-request error with structured context.
    #[must_use]
    pub fn bad_request_with_details(
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self::BadRequest {
            message: message.into(),
            details: Some(details),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::BadRequest { .. } => "BAD_REQUEST",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the structured details attached to this error, if any.
    ///
    /// For `Internal` this exposes nothing; the source chain is available
    /// via [`std::error::Error::source`] for logging.
    #[must_use]
    pub fn details(&self) -> Option<&serde_json::Value> {
        match self {
            Self::NotFound { details, .. }
            | Self::Validation { details, .. }
            | Self::BadRequest { details, .. } => details.as_ref(),
            Self::Internal { .. } => None,
        }
    }

    /// Converts this error to its wire representation.
    ///
    /// The three client-error kinds keep their details; `Internal`
    /// deliberately drops both its details and its message specifics so no
    /// implementation detail leaks into the response body.
    #[must_use]
    pub fn to_body(&self) -> ErrorBody {
        match self {
            Self::Internal { .. } => ErrorBody {
                code: self.code().to_string(),
                message: "An unexpected error occurred".to_string(),
                details: None,
            },
            Self::NotFound { message, details }
            | Self::Validation { message, details }
            | Self::BadRequest { message, details } => ErrorBody {
                code: self.code().to_string(),
                message: message.clone(),
                details: details.clone(),
            },
        }
    }
}

/// Serializable error body: `{code, message, details?}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional structured context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_not_found() {
        let error = ApiError::not_found("Pet with id 5 not found");
        assert_eq!(error.code(), "NOT_FOUND");
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
        assert!(error.to_string().contains("Pet with id 5"));
    }

    #[test]
    fn test_validation_with_details() {
        let error =
            ApiError::validation_with_details("Category has pets", json!({"petCount": 3}));
        assert_eq!(error.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = error.to_body();
        assert_eq!(body.code, "VALIDATION_ERROR");
        assert_eq!(body.details.unwrap()["petCount"], 3);
    }

    #[test]
    fn test_bad_request() {
        let error = ApiError::bad_request("Id must be a positive integer");
        assert_eq!(error.code(), "BAD_REQUEST");
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_hides_details() {
        let source = std::io::Error::other("disk on fire");
        let error = ApiError::internal_with_source("storage exploded", source);

        let body = error.to_body();
        assert_eq!(body.code, "INTERNAL_ERROR");
        assert_eq!(body.message, "An unexpected error occurred");
        assert!(body.details.is_none());
        assert!(!body.message.contains("disk"));

        // The source chain stays reachable for server-side logging.
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_body_serialization_omits_absent_details() {
        let body = ApiError::not_found("gone").to_body();
        let json = serde_json::to_string(&body).expect("serialization should work");
        assert!(json.contains("\"code\":\"NOT_FOUND\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_details_accessor() {
        let error = ApiError::bad_request_with_details("bad id", json!({"id": -1}));
        assert_eq!(error.details().unwrap()["id"], -1);

        let internal = ApiError::internal("whatever");
        assert!(internal.details().is_none());
    }
}
