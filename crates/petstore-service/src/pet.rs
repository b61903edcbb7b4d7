//! Pet business logic.
//!
//! Writes that reference a category check its existence first for a
//! friendly error, with the foreign-key constraint as the authority when
//! the check loses a race. Partial updates are merged against current
//! state here, and the storage layer always writes the full field set.

use serde::{Deserialize, Deserializer};
use serde_json::json;
use tracing::instrument;

use petstore_core::{ApiError, ApiResult};
use petstore_store::{Database, PetRepo, StoreError};

use crate::category::CategoryService;
use crate::model::{validate_id, Pet, PetStatus};

/// Input for creating a pet.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPet {
    /// Pet name, required and non-empty.
    pub name: String,
    /// Status string; defaults to `available` when absent.
    #[serde(default)]
    pub status: Option<String>,
    /// Category to reference, if any.
    #[serde(default)]
    pub category_id: Option<i64>,
}

/// Tri-state category field on an update.
///
/// The wire distinguishes an absent `categoryId` (leave as-is) from an
/// explicit `"categoryId": null` (detach).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryPatch {
    /// Field absent: keep the current reference.
    #[default]
    Unchanged,
    /// Field explicitly null: remove the reference.
    Detach,
    /// Field set: reference this category.
    Set(i64),
}

fn category_patch<'de, D>(deserializer: D) -> Result<CategoryPatch, D::Error>
where
    D: Deserializer<'de>,
{
    // Reaching this function at all means the field was present.
    let value = Option::<i64>::deserialize(deserializer)?;
    Ok(match value {
        Some(id) => CategoryPatch::Set(id),
        None => CategoryPatch::Detach,
    })
}

/// Input for updating a pet. Absent fields keep their current values.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePet {
    /// Id of the pet to update.
    pub id: i64,
    /// New name, if supplied.
    #[serde(default)]
    pub name: Option<String>,
    /// New status string, if supplied.
    #[serde(default)]
    pub status: Option<String>,
    /// Category change, if any.
    #[serde(default, rename = "categoryId", deserialize_with = "category_patch")]
    pub category: CategoryPatch,
}

/// Business rules for pets.
#[derive(Debug, Clone)]
pub struct PetService {
    repo: PetRepo,
    categories: CategoryService,
}

impl PetService {
    /// Creates a service over the given database.
    #[must_use]
    pub fn new(db: &Database) -> Self {
        Self {
            repo: PetRepo::new(db),
            categories: CategoryService::new(db),
        }
    }

    /// Creates a pet, defaulting status to `available`.
    #[instrument(skip(self, new), fields(name = %new.name))]
    pub async fn create(&self, new: NewPet) -> ApiResult<Pet> {
        let name = valid_name(&new.name)?;
        let status = parse_body_status(new.status.as_deref())?;

        let category = match new.category_id {
            Some(id) => Some(self.categories.snapshot(id).await?),
            None => None,
        };

        let row = match self
            .repo
            .insert(name, status.as_str(), category.as_ref().map(|c| c.id))
            .await
        {
            Ok(row) => row,
            Err(e) if e.is_foreign_key_violation() => {
                // The category vanished between the check and the insert.
                return Err(dangling_category(new.category_id.unwrap_or_default()));
            }
            Err(e) => return Err(storage(e)),
        };

        Pet::from_row(row, category)
    }

    /// Applies a partial update to a pet.
    #[instrument(skip(self, patch), fields(id = patch.id))]
    pub async fn update(&self, patch: UpdatePet) -> ApiResult<Pet> {
        let id = validate_id(patch.id, "pet")?;

        let current = self
            .repo
            .find_by_id(id)
            .await
            .map_err(storage)?
            .ok_or_else(|| not_found(id))?;

        let name = match &patch.name {
            Some(n) => valid_name(n)?.to_string(),
            None => current.name.clone(),
        };
        let status = match &patch.status {
            Some(s) => parse_body_status(Some(s))?,
            None => current.status.parse::<PetStatus>().map_err(|e| {
                ApiError::internal_with_source(
                    format!("pet {id} has a status outside the enum"),
                    e,
                )
            })?,
        };
        let category_id = match patch.category {
            CategoryPatch::Unchanged => current.category_id,
            CategoryPatch::Detach => None,
            CategoryPatch::Set(cid) => Some(self.categories.snapshot(cid).await?.id),
        };

        match self
            .repo
            .update(id, &name, status.as_str(), category_id)
            .await
        {
            Ok(()) => {}
            Err(StoreError::RowNotFound) => return Err(not_found(id)),
            Err(e) if e.is_foreign_key_violation() => {
                return Err(dangling_category(category_id.unwrap_or_default()));
            }
            Err(e) => return Err(storage(e)),
        }

        // Re-read joined so the response carries the fresh category snapshot.
        let row = self
            .repo
            .find_by_id(id)
            .await
            .map_err(storage)?
            .ok_or_else(|| not_found(id))?;
        Pet::from_joined_row(row)
    }

    /// Looks up a pet by id.
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: i64) -> ApiResult<Pet> {
        let id = validate_id(id, "pet")?;
        let row = self
            .repo
            .find_by_id(id)
            .await
            .map_err(storage)?
            .ok_or_else(|| not_found(id))?;
        Pet::from_joined_row(row)
    }

    /// Returns pets with the given status, newest-first.
    ///
    /// An absent status means `available`. An invalid one is a
    /// `BadRequest`: this is query input, caught before touching storage.
    #[instrument(skip(self))]
    pub async fn find_by_status(&self, status: Option<&str>) -> ApiResult<Vec<Pet>> {
        let status = match status {
            Some(s) => s.parse::<PetStatus>().map_err(|e| {
                ApiError::bad_request_with_details(
                    e.to_string(),
                    json!({ "status": s, "allowed": PetStatus::ALL }),
                )
            })?,
            None => PetStatus::Available,
        };

        let rows = self
            .repo
            .find_by_status(status.as_str())
            .await
            .map_err(storage)?;
        rows.into_iter().map(Pet::from_joined_row).collect()
    }

    /// Returns all pets regardless of status, newest-first.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> ApiResult<Vec<Pet>> {
        let rows = self.repo.list_all().await.map_err(storage)?;
        rows.into_iter().map(Pet::from_joined_row).collect()
    }

    /// Deletes a pet.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        let id = validate_id(id, "pet")?;
        match self.repo.delete(id).await {
            Ok(()) => Ok(()),
            Err(StoreError::RowNotFound) => Err(not_found(id)),
            Err(e) => Err(storage(e)),
        }
    }
}

fn valid_name(name: &str) -> ApiResult<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Pet name must not be empty"));
    }
    Ok(trimmed)
}

/// Parses a status from a request body. Invalid values are a `Validation`
/// failure, unlike the query-parameter path where they are a `BadRequest`.
fn parse_body_status(status: Option<&str>) -> ApiResult<PetStatus> {
    match status {
        Some(s) => s.parse::<PetStatus>().map_err(|e| {
            ApiError::validation_with_details(
                e.to_string(),
                json!({ "status": s, "allowed": PetStatus::ALL }),
            )
        }),
        None => Ok(PetStatus::Available),
    }
}

fn not_found(id: i64) -> ApiError {
    ApiError::not_found_with_details(format!("Pet with id {id} not found"), json!({ "id": id }))
}

fn dangling_category(id: i64) -> ApiError {
    ApiError::validation_with_details(
        format!("Category with id {id} does not exist"),
        json!({ "categoryId": id }),
    )
}

fn storage(e: StoreError) -> ApiError {
    ApiError::internal_with_source("storage operation failed", e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CategoryRef;

    async fn services() -> (Database, PetService, CategoryService) {
        let db = Database::in_memory().await.expect("connect");
        db.init_schema().await.expect("schema");
        let pets = PetService::new(&db);
        let categories = CategoryService::new(&db);
        (db, pets, categories)
    }

    fn new_pet(name: &str, status: Option<&str>, category_id: Option<i64>) -> NewPet {
        NewPet {
            name: name.to_string(),
            status: status.map(String::from),
            category_id,
        }
    }

    #[tokio::test]
    async fn test_create_defaults_to_available() {
        let (_db, pets, _categories) = services().await;

        let pet = pets.create(new_pet("Rex", None, None)).await.expect("create");
        assert_eq!(pet.status, PetStatus::Available);
        assert!(pet.category.is_none());
    }

    #[tokio::test]
    async fn test_create_with_category_embeds_snapshot() {
        let (_db, pets, categories) = services().await;

        let cat = categories.create("Dogs").await.expect("category");
        let pet = pets
            .create(new_pet("Balu", Some("sold"), Some(cat.id)))
            .await
            .expect("create");

        assert_eq!(pet.status, PetStatus::Sold);
        assert_eq!(
            pet.category,
            Some(CategoryRef {
                id: cat.id,
                name: "Dogs".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_create_empty_name_is_validation() {
        let (_db, pets, _categories) = services().await;
        let err = pets
            .create(new_pet("  ", None, None))
            .await
            .expect_err("empty name");
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_create_invalid_status_is_validation() {
        let (_db, pets, _categories) = services().await;
        let err = pets
            .create(new_pet("Rex", Some("lost"), None))
            .await
            .expect_err("bad status");
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(err.details().expect("details")["status"], "lost");
    }

    #[tokio::test]
    async fn test_create_dangling_category_is_validation() {
        let (_db, pets, _categories) = services().await;
        let err = pets
            .create(new_pet("Ghost", None, Some(999)))
            .await
            .expect_err("dangling");
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(err.details().expect("details")["categoryId"], 999);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let (_db, pets, _categories) = services().await;
        let err = pets.get_by_id(42).await.expect_err("missing");
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_get_nonpositive_id_is_bad_request() {
        let (_db, pets, _categories) = services().await;
        let err = pets.get_by_id(-1).await.expect_err("negative");
        assert_eq!(err.code(), "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_update_merges_partial_fields() {
        let (_db, pets, categories) = services().await;

        let cat = categories.create("Dogs").await.expect("category");
        let pet = pets
            .create(new_pet("Balu", Some("available"), Some(cat.id)))
            .await
            .expect("create");

        // Only the status changes; name and category stay.
        let updated = pets
            .update(UpdatePet {
                id: pet.id,
                name: None,
                status: Some("sold".to_string()),
                category: CategoryPatch::Unchanged,
            })
            .await
            .expect("update");

        assert_eq!(updated.name, "Balu");
        assert_eq!(updated.status, PetStatus::Sold);
        assert_eq!(updated.category.as_ref().map(|c| c.id), Some(cat.id));
    }

    #[tokio::test]
    async fn test_update_detaches_category() {
        let (_db, pets, categories) = services().await;

        let cat = categories.create("Dogs").await.expect("category");
        let pet = pets
            .create(new_pet("Balu", None, Some(cat.id)))
            .await
            .expect("create");

        let updated = pets
            .update(UpdatePet {
                id: pet.id,
                name: None,
                status: None,
                category: CategoryPatch::Detach,
            })
            .await
            .expect("update");

        assert!(updated.category.is_none());
        // The category itself is untouched and now deletable.
        categories.delete(cat.id).await.expect("delete category");
    }

    #[tokio::test]
    async fn test_update_reattaches_category() {
        let (_db, pets, categories) = services().await;

        let dogs = categories.create("Dogs").await.expect("category");
        let cats = categories.create("Cats").await.expect("category");
        let pet = pets
            .create(new_pet("Balu", None, Some(dogs.id)))
            .await
            .expect("create");

        let updated = pets
            .update(UpdatePet {
                id: pet.id,
                name: None,
                status: None,
                category: CategoryPatch::Set(cats.id),
            })
            .await
            .expect("update");

        assert_eq!(updated.category.as_ref().map(|c| c.name.as_str()), Some("Cats"));
    }

    #[tokio::test]
    async fn test_update_to_missing_category_is_validation() {
        let (_db, pets, _categories) = services().await;

        let pet = pets.create(new_pet("Rex", None, None)).await.expect("create");
        let err = pets
            .update(UpdatePet {
                id: pet.id,
                name: None,
                status: None,
                category: CategoryPatch::Set(999),
            })
            .await
            .expect_err("dangling");
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_update_missing_pet_is_not_found() {
        let (_db, pets, _categories) = services().await;
        let err = pets
            .update(UpdatePet {
                id: 42,
                name: Some("Nobody".to_string()),
                status: None,
                category: CategoryPatch::Unchanged,
            })
            .await
            .expect_err("missing");
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_find_by_status_defaults_to_available() {
        let (_db, pets, _categories) = services().await;

        pets.create(new_pet("First", Some("available"), None))
            .await
            .expect("create");
        pets.create(new_pet("Second", Some("sold"), None))
            .await
            .expect("create");
        pets.create(new_pet("Third", Some("available"), None))
            .await
            .expect("create");

        let found = pets.find_by_status(None).await.expect("find");
        let names: Vec<&str> = found.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Third", "First"]);
    }

    #[tokio::test]
    async fn test_find_by_invalid_status_is_bad_request() {
        let (_db, pets, _categories) = services().await;
        let err = pets
            .find_by_status(Some("lost"))
            .await
            .expect_err("bad status");
        assert_eq!(err.code(), "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_delete() {
        let (_db, pets, _categories) = services().await;

        let pet = pets.create(new_pet("Rex", None, None)).await.expect("create");
        pets.delete(pet.id).await.expect("delete");

        let err = pets.delete(pet.id).await.expect_err("already gone");
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_update_pet_wire_shape_distinguishes_null_from_absent() {
        let absent: UpdatePet =
            serde_json::from_str(r#"{"id": 1, "name": "Rex"}"#).expect("parse");
        assert_eq!(absent.category, CategoryPatch::Unchanged);

        let null: UpdatePet =
            serde_json::from_str(r#"{"id": 1, "categoryId": null}"#).expect("parse");
        assert_eq!(null.category, CategoryPatch::Detach);

        let set: UpdatePet =
            serde_json::from_str(r#"{"id": 1, "categoryId": 7}"#).expect("parse");
        assert_eq!(set.category, CategoryPatch::Set(7));
    }
}
