//! Operation handlers.
//!
//! One async handler per contract operation. Each handler deserializes
//! the merged, schema-coerced input, calls exactly one service method and
//! returns its result; typed errors flow through untouched.

mod category;
mod pet;

use petstore_server::HandlerRegistry;
use petstore_store::Database;

/// Registers every operation handler.
pub fn register_all(registry: &mut HandlerRegistry, db: &Database) {
    pet::register(registry, db);
    category::register(registry, db);
}

/// Acknowledgement body returned by delete operations.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct DeleteAck {
    /// Human-readable confirmation.
    pub message: String,
}
