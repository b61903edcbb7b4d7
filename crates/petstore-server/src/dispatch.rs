//! The contract-driven dispatch pipeline.
//!
//! One request flows through these stages, in order:
//!
//! 1. route match against the contract-derived table (miss is a 404)
//! 2. path + query parameters coerced against the operation's parameter
//!    schema (violation is a 400, the handler never runs)
//! 3. JSON body coerced against the request-body schema (same failure mode)
//! 4. body fields and parameters merged into one input value, parameters
//!    winning on collision
//! 5. handler invocation through the registry
//! 6. success payload filtered down to the declared response shape
//!
//! Typed handler errors are translated to the wire envelope here; internal
//! errors are logged with their source chain and leave the process with a
//! generic body.

use std::collections::HashMap;

use bytes::Bytes;
use http::{Method, StatusCode};
use serde_json::Value;

use petstore_core::{ApiError, Contract, Operation, RequestContext};

use crate::handler::{HandlerRegistry, MissingHandlers};
use crate::router::Router;

/// The outcome of dispatching one request: a status and a JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// JSON response body.
    pub body: Value,
}

/// Contract-driven request dispatcher.
///
/// Owns the contract, the route table derived from it, and the handler
/// registry. Construction fails if any contract operation lacks a handler.
pub struct Dispatcher {
    contract: Contract,
    router: Router,
    registry: HandlerRegistry,
}

impl Dispatcher {
    /// Builds a dispatcher, verifying handler completeness.
    pub fn new(contract: Contract, registry: HandlerRegistry) -> Result<Self, MissingHandlers> {
        registry.verify_contract(&contract)?;
        let router = Router::from_contract(&contract);
        Ok(Self {
            contract,
            router,
            registry,
        })
    }

    /// Returns the contract this dispatcher serves.
    #[must_use]
    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    /// Dispatches one request through the full pipeline.
    pub async fn dispatch(
        &self,
        method: &Method,
        path: &str,
        query: Option<&str>,
        body: Bytes,
    ) -> DispatchResponse {
        let Some(route) = self.router.match_route(method, path) else {
            return error_response(&ApiError::not_found_with_details(
                format!("No route for {method} {path}"),
                serde_json::json!({ "method": method.as_str(), "path": path }),
            ));
        };

        let operation_id = route.operation_id().to_string();
        let Some(operation) = self.contract.get(&operation_id) else {
            // Unreachable with a router built from this contract.
            return error_response(&ApiError::internal(format!(
                "route matched unknown operation '{operation_id}'"
            )));
        };

        let ctx = RequestContext::new().with_operation_id(&operation_id);
        tracing::debug!(
            request_id = %ctx.request_id(),
            operation = %operation_id,
            "dispatching {} {}",
            method,
            path
        );

        let input = match build_input(operation, route.params(), query, &body) {
            Ok(input) => input,
            Err(e) => {
                tracing::warn!(operation = %operation_id, error = %e, "request rejected");
                return error_response(&e);
            }
        };

        match self.registry.invoke(&operation_id, ctx, input).await {
            Ok(payload) => {
                let payload = match operation.response_body() {
                    Some(schema) => schema.filter_response(payload),
                    None => payload,
                };
                DispatchResponse {
                    status: StatusCode::OK,
                    body: payload,
                }
            }
            Err(e) => {
                log_handler_error(&operation_id, &e);
                error_response(&e)
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("contract", &self.contract.name())
            .field("routes", &self.router.route_count())
            .finish()
    }
}

/// Builds the merged handler input from parameters and body.
fn build_input(
    operation: &Operation,
    path_params: &HashMap<String, String>,
    query: Option<&str>,
    body: &Bytes,
) -> Result<Value, ApiError> {
    // Path and query parameters arrive as strings; the parameter schema
    // coerces them to their declared types.
    let mut raw_params = serde_json::Map::new();
    for (key, value) in path_params {
        raw_params.insert(key.clone(), Value::String(value.clone()));
    }
    for (key, value) in parse_query(query.unwrap_or("")) {
        raw_params.insert(key, Value::String(value));
    }

    let params = match operation.parameters() {
        Some(schema) => schema
            .coerce(&Value::Object(raw_params))
            .map_err(|v| bad_request_violation("Invalid request parameters", &v))?,
        None => Value::Object(raw_params),
    };

    let body_value = match operation.request_body() {
        Some(schema) => {
            let raw: Value = if body.is_empty() {
                // Absent body still goes through coercion so declared
                // defaults and required properties apply.
                Value::Object(serde_json::Map::new())
            } else {
                serde_json::from_slice(body).map_err(|e| {
                    ApiError::bad_request(format!("Request body is not valid JSON: {e}"))
                })?
            };
            schema
                .coerce(&raw)
                .map_err(|v| bad_request_violation("Invalid request body", &v))?
        }
        None => Value::Object(serde_json::Map::new()),
    };

    // Body fields first, parameters override on collision.
    let mut merged = match body_value {
        Value::Object(map) => map,
        other => {
            let mut map = serde_json::Map::new();
            map.insert("body".to_string(), other);
            map
        }
    };
    if let Value::Object(params) = params {
        for (key, value) in params {
            merged.insert(key, value);
        }
    }

    Ok(Value::Object(merged))
}

fn bad_request_violation(
    message: &str,
    violation: &petstore_core::SchemaViolation,
) -> ApiError {
    ApiError::bad_request_with_details(
        format!("{message}: {violation}"),
        violation.to_details(),
    )
}

/// Parses a query string into key/value pairs.
///
/// Handles `+` and percent-encoding; keys without a value map to the empty
/// string.
fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (percent_decode(key), percent_decode(value))
        })
        .collect()
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => {
                if let Some(hex) = input.get(i + 1..i + 3) {
                    if let Ok(byte) = u8::from_str_radix(hex, 16) {
                        out.push(byte);
                        i += 3;
                        continue;
                    }
                }
                out.push(b'%');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn error_response(error: &ApiError) -> DispatchResponse {
    let body = serde_json::to_value(error.to_body())
        .unwrap_or_else(|_| serde_json::json!({"code": "INTERNAL_ERROR"}));
    DispatchResponse {
        status: error.status_code(),
        body,
    }
}

fn log_handler_error(operation_id: &str, error: &ApiError) {
    match error {
        ApiError::Internal { message, source } => {
            tracing::error!(
                operation = %operation_id,
                error = %message,
                source = ?source,
                "handler failed"
            );
        }
        other => {
            tracing::warn!(operation = %operation_id, error = %other, "handler rejected request");
        }
    }
}
