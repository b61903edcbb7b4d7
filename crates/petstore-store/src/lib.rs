//! SQLite storage layer for the petstore service.
//!
//! The storage engine itself is delegated entirely to SQLite through sqlx;
//! this crate owns the pool lifecycle, the schema bootstrap and the two
//! repositories ([`CategoryRepo`], [`PetRepo`]). Uniqueness and foreign-key
//! validity are enforced here by the database's own constraints; the
//! service layer's pre-checks are advisory only.
//!
//! Errors surface as [`StoreError`], which callers classify via
//! [`StoreError::is_unique_violation`], [`StoreError::is_foreign_key_violation`]
//! and [`StoreError::is_row_not_found`] before translating to typed API errors.

pub mod category;
pub mod db;
pub mod error;
pub mod pet;

pub use category::{CategoryRepo, CategoryRow};
pub use db::Database;
pub use error::{StoreError, StoreResult};
pub use pet::{PetRepo, PetRow, PetWithCategoryRow};
