//! Handler registration and invocation.
//!
//! Handlers are async functions registered against contract operation ids.
//! The registry erases their concrete request/response types: the
//! dispatcher hands each handler the merged, schema-coerced input as a
//! JSON value, and gets a JSON value or a typed [`ApiError`] back.
//!
//! The registry is checked against the contract at startup via
//! [`HandlerRegistry::verify_contract`]; operations without a handler make
//! the server refuse to start.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use petstore_core::{ApiError, Contract, RequestContext};

/// Boxed future returned by an erased handler.
pub type BoxedHandlerResult =
    Pin<Box<dyn Future<Output = Result<serde_json::Value, ApiError>> + Send>>;

/// A type-erased operation handler.
pub type ErasedHandler =
    Arc<dyn Fn(RequestContext, serde_json::Value) -> BoxedHandlerResult + Send + Sync>;

/// Registry mapping operation ids to their handlers.
///
/// # Example
///
/// ```rust
/// use petstore_server::HandlerRegistry;
///
/// let registry = HandlerRegistry::new();
/// assert!(registry.is_empty());
/// ```
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, ErasedHandler>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registers a typed handler for an operation.
    ///
    /// The handler takes the request context and a deserialized request
    /// type, and returns a serializable response or an [`ApiError`]. The
    /// dispatcher has already validated and coerced the input against the
    /// operation's schemas; a deserialization failure here means the input
    /// shape still does not fit the handler's type and is reported as a
    /// bad request.
    pub fn register<Req, Res, F, Fut>(&mut self, operation_id: impl Into<String>, handler: F)
    where
        Req: DeserializeOwned + Send + 'static,
        Res: Serialize + Send + 'static,
        F: Fn(RequestContext, Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Res, ApiError>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let erased: ErasedHandler = Arc::new(move |ctx, input| {
            let handler = Arc::clone(&handler);
            Box::pin(async move {
                let request: Req = serde_json::from_value(input).map_err(|e| {
                    ApiError::bad_request(format!("Invalid request shape: {e}"))
                })?;

                let response = handler(ctx, request).await?;

                serde_json::to_value(&response).map_err(|e| {
                    ApiError::internal_with_source("failed to serialize response", e)
                })
            })
        });

        self.handlers.insert(operation_id.into(), erased);
    }

    /// Checks whether a handler is registered for an operation.
    #[must_use]
    pub fn contains(&self, operation_id: &str) -> bool {
        self.handlers.contains_key(operation_id)
    }

    /// Returns the number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Returns the registered operation ids.
    pub fn operation_ids(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Verifies that every operation in the contract has a handler.
    ///
    /// Called once at startup. The error lists every unhandled operation
    /// so a misconfigured deployment fails loudly and completely.
    pub fn verify_contract(&self, contract: &Contract) -> Result<(), MissingHandlers> {
        let mut missing: Vec<String> = contract
            .operations()
            .iter()
            .filter(|op| !self.contains(op.operation_id()))
            .map(|op| op.operation_id().to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            missing.sort();
            Err(MissingHandlers {
                operation_ids: missing,
            })
        }
    }

    /// Invokes the handler for an operation.
    ///
    /// An unregistered operation id at invoke time can only happen if the
    /// startup completeness check was skipped, so it maps to an internal
    /// error rather than a routing miss.
    pub async fn invoke(
        &self,
        operation_id: &str,
        ctx: RequestContext,
        input: serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        let handler = self.handlers.get(operation_id).ok_or_else(|| {
            ApiError::internal(format!(
                "no handler registered for operation '{operation_id}'"
            ))
        })?;

        handler(ctx, input).await
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Startup configuration failure: contract operations without handlers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no handlers registered for contract operations: {}", operation_ids.join(", "))]
pub struct MissingHandlers {
    /// The unhandled operation ids, sorted.
    pub operation_ids: Vec<String>,
}
