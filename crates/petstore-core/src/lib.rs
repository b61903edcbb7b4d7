//! Core types for the petstore service.
//!
//! This crate holds the pieces every other layer depends on:
//!
//! - [`error`]: the four-kind error taxonomy ([`ApiError`]) and its wire
//!   representation ([`ErrorBody`])
//! - [`contract`]: the interface-contract model (operations, schemas,
//!   validation and coercion) the dispatcher is driven by
//! - [`context`]: the per-request [`RequestContext`]

pub mod context;
pub mod contract;
pub mod error;

pub use context::RequestContext;
pub use contract::{Contract, ContractError, Operation, Schema, SchemaViolation};
pub use error::{ApiError, ApiResult, ErrorBody};
