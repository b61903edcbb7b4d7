//! Business logic for the petstore service.
//!
//! Two services with real invariants:
//!
//! - [`CategoryService`]: name uniqueness, block-delete-if-referenced
//! - [`PetService`]: status enum, category-existence on write, default status
//!
//! Both perform advisory pre-checks for friendly error messages and still
//! catch the storage layer's authoritative constraint violations at write
//! time; the race between check and write is real and both paths must
//! produce the same typed error.

pub mod category;
pub mod model;
pub mod pet;

pub use category::CategoryService;
pub use model::{Category, CategoryRef, CategoryWithPets, Pet, PetStatus};
pub use pet::{CategoryPatch, NewPet, PetService, UpdatePet};
