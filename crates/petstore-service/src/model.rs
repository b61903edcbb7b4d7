//! Domain models as exposed on the wire.
//!
//! These are entity shapes only: storage-internal columns (raw foreign
//! keys, audit timestamps) never appear here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use petstore_core::ApiError;
use petstore_store::{CategoryRow, PetRow, PetWithCategoryRow};

/// Pet lifecycle status: a closed enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetStatus {
    /// Up for adoption. The default when omitted on create.
    #[default]
    Available,
    /// Adoption pending.
    Pending,
    /// Adopted.
    Sold,
}

impl PetStatus {
    /// Returns the wire/storage string for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Pending => "pending",
            Self::Sold => "sold",
        }
    }

    /// All valid status strings, for error messages.
    pub const ALL: [&'static str; 3] = ["available", "pending", "sold"];
}

impl fmt::Display for PetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a status string outside the closed enum.
///
/// Callers decide the API error kind: an invalid status in a request body
/// is a `Validation` failure, in a query parameter a `BadRequest`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a valid status; expected one of: available, pending, sold")]
pub struct InvalidStatus(pub String);

impl FromStr for PetStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "pending" => Ok(Self::Pending),
            "sold" => Ok(Self::Sold),
            other => Err(InvalidStatus(other.to_string())),
        }
    }
}

/// A category: `{id, name}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Generated id.
    pub id: i64,
    /// Unique name.
    pub name: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}

/// The embedded category snapshot on a pet: `{id, name}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    /// Category id.
    pub id: i64,
    /// Category name at read time.
    pub name: String,
}

/// A category with its associated pets embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryWithPets {
    /// Generated id.
    pub id: i64,
    /// Unique name.
    pub name: String,
    /// Pets referencing this category, newest-first.
    pub pets: Vec<Pet>,
}

/// A pet: `{id, name, status, category?}`.
///
/// The category, when present, is a presentation-time snapshot of the
/// referenced row, embedded as `{id, name}` and omitted entirely when the
/// pet has none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    /// Generated id.
    pub id: i64,
    /// Pet name.
    pub name: String,
    /// Lifecycle status.
    pub status: PetStatus,
    /// Embedded category snapshot, if referenced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryRef>,
}

impl Pet {
    /// Builds a pet from a joined read.
    ///
    /// A status string outside the enum can only mean corrupted storage,
    /// so it maps to an internal error.
    pub fn from_joined_row(row: PetWithCategoryRow) -> Result<Self, ApiError> {
        let status = row.status.parse::<PetStatus>().map_err(|e| {
            ApiError::internal_with_source(
                format!("pet {} has a status outside the enum", row.id),
                e,
            )
        })?;

        let category = match (row.category_id, row.category_name) {
            (Some(id), Some(name)) => Some(CategoryRef { id, name }),
            _ => None,
        };

        Ok(Self {
            id: row.id,
            name: row.name,
            status,
            category,
        })
    }

    /// Builds a pet from a bare row plus an optional category snapshot.
    pub fn from_row(row: PetRow, category: Option<CategoryRef>) -> Result<Self, ApiError> {
        let status = row.status.parse::<PetStatus>().map_err(|e| {
            ApiError::internal_with_source(
                format!("pet {} has a status outside the enum", row.id),
                e,
            )
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            status,
            category,
        })
    }
}

/// Checks that an id is a positive integer.
///
/// Raised before touching storage, so this is a `BadRequest`, not a
/// `Validation` failure.
pub fn validate_id(id: i64, what: &str) -> Result<i64, ApiError> {
    if id < 1 {
        return Err(ApiError::bad_request_with_details(
            format!("{what} id must be a positive integer"),
            serde_json::json!({ "id": id }),
        ));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for s in PetStatus::ALL {
            let status: PetStatus = s.parse().expect("valid status");
            assert_eq!(status.as_str(), s);
        }
    }

    #[test]
    fn test_status_default_is_available() {
        assert_eq!(PetStatus::default(), PetStatus::Available);
    }

    #[test]
    fn test_status_rejects_unknown() {
        let err = "lost".parse::<PetStatus>().expect_err("invalid");
        assert!(err.to_string().contains("available, pending, sold"));
    }

    #[test]
    fn test_pet_serialization_omits_absent_category() {
        let pet = Pet {
            id: 2,
            name: "Rex".to_string(),
            status: PetStatus::Available,
            category: None,
        };
        let json = serde_json::to_value(&pet).expect("serialize");
        assert_eq!(json["status"], "available");
        assert!(json.get("category").is_none());
    }

    #[test]
    fn test_pet_serialization_embeds_category() {
        let pet = Pet {
            id: 1,
            name: "Balu".to_string(),
            status: PetStatus::Sold,
            category: Some(CategoryRef {
                id: 1,
                name: "Dogs".to_string(),
            }),
        };
        let json = serde_json::to_value(&pet).expect("serialize");
        assert_eq!(json["category"]["name"], "Dogs");
    }

    #[test]
    fn test_from_joined_row_bad_status_is_internal() {
        let row = PetWithCategoryRow {
            id: 9,
            name: "Glitch".to_string(),
            status: "broken".to_string(),
            category_id: None,
            category_name: None,
        };
        let err = Pet::from_joined_row(row).expect_err("bad status");
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_validate_id() {
        assert_eq!(validate_id(1, "pet").unwrap(), 1);
        let err = validate_id(0, "pet").expect_err("zero");
        assert_eq!(err.code(), "BAD_REQUEST");
        let err = validate_id(-5, "category").expect_err("negative");
        assert!(err.to_string().contains("category id"));
    }
}
