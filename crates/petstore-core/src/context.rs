//! Per-request context.
//!
//! A [`RequestContext`] accompanies every dispatched request: a correlation
//! id for logs plus the operation the dispatcher resolved.

use uuid::Uuid;

/// Context attached to a single request as it flows through dispatch.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Correlation id for this request.
    request_id: Uuid,
    /// The contract operation this request was bound to, once resolved.
    operation_id: Option<String>,
}

impl RequestContext {
    /// Creates a new context with a fresh request id.
    #[must_use]
    pub fn new() -> Self {
        Self {
            request_id: Uuid::now_v7(),
            operation_id: None,
        }
    }

    /// Attaches the resolved operation id.
    #[must_use]
    pub fn with_operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = Some(operation_id.into());
        self
    }

    /// Returns the request correlation id.
    #[must_use]
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Returns the resolved operation id, if any.
    #[must_use]
    pub fn operation_id(&self) -> Option<&str> {
        self.operation_id.as_deref()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
