//! Contract-driven CRUD API server for pets and categories.
//!
//! This crate wires the layers together: it ships the default interface
//! contract, registers one handler per contract operation, and exposes
//! [`build_dispatcher`] so the binary and the end-to-end tests assemble
//! the exact same pipeline.

pub mod contract;
pub mod handlers;

use petstore_server::{Dispatcher, HandlerRegistry, MissingHandlers};
use petstore_store::Database;

/// Builds the full dispatch pipeline over an open database.
///
/// Registers every operation handler and verifies completeness against
/// the given contract.
pub fn build_dispatcher(
    contract: petstore_core::Contract,
    db: &Database,
) -> Result<Dispatcher, MissingHandlers> {
    let mut registry = HandlerRegistry::new();
    handlers::register_all(&mut registry, db);
    Dispatcher::new(contract, registry)
}
