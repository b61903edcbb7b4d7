//! Category business logic.
//!
//! Invariants enforced here:
//!
//! - names are unique (case-sensitive exact match)
//! - a category referenced by at least one pet cannot be deleted

use serde_json::json;
use tracing::instrument;

use petstore_core::{ApiError, ApiResult};
use petstore_store::{CategoryRepo, Database, PetRepo, StoreError};

use crate::model::{validate_id, Category, CategoryRef, CategoryWithPets, Pet};

/// Business rules for categories.
#[derive(Debug, Clone)]
pub struct CategoryService {
    repo: CategoryRepo,
}

impl CategoryService {
    /// Creates a service over the given database.
    #[must_use]
    pub fn new(db: &Database) -> Self {
        Self {
            repo: CategoryRepo::new(db),
        }
    }

    /// Returns all categories, ordered by name.
    #[instrument(skip(self))]
    pub async fn list(&self) -> ApiResult<Vec<Category>> {
        let rows = self.repo.list_by_name().await.map_err(storage)?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// Looks up a category by id.
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: i64) -> ApiResult<Category> {
        let id = validate_id(id, "category")?;
        let row = self
            .repo
            .find_by_id(id)
            .await
            .map_err(storage)?
            .ok_or_else(|| not_found(id))?;
        Ok(Category::from(row))
    }

    /// Creates a category with a unique name.
    ///
    /// The pre-check via `find_by_name` gives a friendly duplicate error in
    /// the common case; the unique constraint at insert time is the
    /// authority and maps to the same error when the pre-check loses a race.
    #[instrument(skip(self))]
    pub async fn create(&self, name: &str) -> ApiResult<Category> {
        let name = valid_name(name)?;

        if let Some(existing) = self.repo.find_by_name(name).await.map_err(storage)? {
            return Err(duplicate(name, existing.id));
        }

        match self.repo.insert(name).await {
            Ok(row) => Ok(Category::from(row)),
            Err(e) if e.is_unique_violation() => Err(duplicate_raced(name)),
            Err(e) => Err(storage(e)),
        }
    }

    /// Renames a category, keeping names unique.
    #[instrument(skip(self))]
    pub async fn update(&self, id: i64, name: &str) -> ApiResult<Category> {
        let id = validate_id(id, "category")?;
        let name = valid_name(name)?;

        // Existence first: a missing row is NotFound even when the target
        // name is taken by another category.
        self.repo
            .find_by_id(id)
            .await
            .map_err(storage)?
            .ok_or_else(|| not_found(id))?;

        // Renaming a category to its own current name is a no-op, not a
        // duplicate.
        if let Some(existing) = self.repo.find_by_name(name).await.map_err(storage)? {
            if existing.id != id {
                return Err(duplicate(name, existing.id));
            }
        }

        match self.repo.update_name(id, name).await {
            Ok(row) => Ok(Category::from(row)),
            Err(StoreError::RowNotFound) => Err(not_found(id)),
            Err(e) if e.is_unique_violation() => Err(duplicate_raced(name)),
            Err(e) => Err(storage(e)),
        }
    }

    /// Deletes a category, refused while pets still reference it.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        let id = validate_id(id, "category")?;

        self.repo
            .find_by_id(id)
            .await
            .map_err(storage)?
            .ok_or_else(|| not_found(id))?;

        let pet_count = self.repo.pet_count(id).await.map_err(storage)?;
        if pet_count > 0 {
            return Err(has_pets(id, pet_count));
        }

        match self.repo.delete(id).await {
            Ok(()) => Ok(()),
            Err(StoreError::RowNotFound) => Err(not_found(id)),
            // A pet got attached between the count and the delete; recount
            // so the reported reference count is current.
            Err(e) if e.is_foreign_key_violation() => {
                let count = self.repo.pet_count(id).await.map_err(storage)?;
                Err(has_pets(id, count.max(1)))
            }
            Err(e) => Err(storage(e)),
        }
    }

    /// Looks up a category with its pets embedded, newest-first.
    ///
    /// The embedded pets carry no category of their own: the enclosing
    /// object already is the category.
    #[instrument(skip(self))]
    pub async fn get_with_pets(&self, id: i64) -> ApiResult<CategoryWithPets> {
        let id = validate_id(id, "category")?;
        let row = self
            .repo
            .find_by_id(id)
            .await
            .map_err(storage)?
            .ok_or_else(|| not_found(id))?;

        let pets = self
            .repo
            .pets_in_category(id)
            .await
            .map_err(storage)?
            .into_iter()
            .map(|p| Pet::from_row(p, None))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CategoryWithPets {
            id: row.id,
            name: row.name,
            pets,
        })
    }

    /// Returns the `{id, name}` snapshot for a category, checking existence.
    ///
    /// Used by the pet service when a write references a category.
    pub(crate) async fn snapshot(&self, id: i64) -> ApiResult<CategoryRef> {
        let row = self
            .repo
            .find_by_id(id)
            .await
            .map_err(storage)?
            .ok_or_else(|| {
                ApiError::validation_with_details(
                    format!("Category with id {id} does not exist"),
                    json!({ "categoryId": id }),
                )
            })?;
        Ok(CategoryRef {
            id: row.id,
            name: row.name,
        })
    }
}

fn valid_name(name: &str) -> ApiResult<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Category name must not be empty"));
    }
    Ok(trimmed)
}

fn not_found(id: i64) -> ApiError {
    ApiError::not_found_with_details(
        format!("Category with id {id} not found"),
        json!({ "id": id }),
    )
}

fn duplicate(name: &str, existing_id: i64) -> ApiError {
    ApiError::validation_with_details(
        format!("Category with name '{name}' already exists"),
        json!({ "name": name, "existingId": existing_id }),
    )
}

fn duplicate_raced(name: &str) -> ApiError {
    ApiError::validation_with_details(
        format!("Category with name '{name}' already exists"),
        json!({ "name": name }),
    )
}

fn has_pets(id: i64, pet_count: i64) -> ApiError {
    ApiError::validation_with_details(
        format!("Category with id {id} still has {pet_count} associated pet(s)"),
        json!({ "id": id, "petCount": pet_count }),
    )
}

fn storage(e: StoreError) -> ApiError {
    ApiError::internal_with_source("storage operation failed", e)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn service() -> (Database, CategoryService) {
        let db = Database::in_memory().await.expect("connect");
        db.init_schema().await.expect("schema");
        let service = CategoryService::new(&db);
        (db, service)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (_db, service) = service().await;

        let created = service.create("Dogs").await.expect("create");
        assert_eq!(created.name, "Dogs");

        let fetched = service.get_by_id(created.id).await.expect("get");
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_trims_name() {
        let (_db, service) = service().await;
        let created = service.create("  Dogs  ").await.expect("create");
        assert_eq!(created.name, "Dogs");
    }

    #[tokio::test]
    async fn test_create_empty_name_is_validation() {
        let (_db, service) = service().await;
        let err = service.create("   ").await.expect_err("empty");
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_create_duplicate_is_validation() {
        let (_db, service) = service().await;

        service.create("Dogs").await.expect("first");
        let err = service.create("Dogs").await.expect_err("duplicate");
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(err.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_names_are_case_sensitive() {
        let (_db, service) = service().await;

        service.create("Dogs").await.expect("first");
        // Different case is a different name.
        service.create("dogs").await.expect("distinct name");
    }

    #[tokio::test]
    async fn test_constraint_backstop_when_precheck_is_bypassed() {
        let (db, service) = service().await;

        // Insert directly at the storage layer, as a racing writer would.
        CategoryRepo::new(&db).insert("Dogs").await.expect("insert");

        let err = service.create("Dogs").await.expect_err("duplicate");
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let (_db, service) = service().await;
        let err = service.get_by_id(42).await.expect_err("missing");
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_get_nonpositive_id_is_bad_request() {
        let (_db, service) = service().await;
        let err = service.get_by_id(0).await.expect_err("zero id");
        assert_eq!(err.code(), "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_update_renames() {
        let (_db, service) = service().await;

        let created = service.create("Dogs").await.expect("create");
        let renamed = service.update(created.id, "Hounds").await.expect("update");
        assert_eq!(renamed.name, "Hounds");
        assert_eq!(renamed.id, created.id);
    }

    #[tokio::test]
    async fn test_update_to_own_name_is_noop() {
        let (_db, service) = service().await;
        let created = service.create("Dogs").await.expect("create");
        let updated = service.update(created.id, "Dogs").await.expect("update");
        assert_eq!(updated, created);
    }

    #[tokio::test]
    async fn test_update_to_taken_name_is_validation() {
        let (_db, service) = service().await;

        service.create("Dogs").await.expect("create");
        let cats = service.create("Cats").await.expect("create");

        let err = service.update(cats.id, "Dogs").await.expect_err("taken");
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let (_db, service) = service().await;
        let err = service.update(42, "Ghosts").await.expect_err("missing");
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_update_missing_id_wins_over_taken_name() {
        let (_db, service) = service().await;

        service.create("Dogs").await.expect("create");

        // The row's absence is reported before the name collision.
        let err = service.update(42, "Dogs").await.expect_err("missing");
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_delete() {
        let (_db, service) = service().await;

        let created = service.create("Dogs").await.expect("create");
        service.delete(created.id).await.expect("delete");

        let err = service.get_by_id(created.id).await.expect_err("gone");
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_delete_with_pets_is_refused() {
        let (db, service) = service().await;

        let created = service.create("Dogs").await.expect("create");
        PetRepo::new(&db)
            .insert("Balu", "available", Some(created.id))
            .await
            .expect("pet insert");

        let err = service.delete(created.id).await.expect_err("has pets");
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(err.details().expect("details")["petCount"], 1);

        // Still present.
        service.get_by_id(created.id).await.expect("still there");
    }

    #[tokio::test]
    async fn test_delete_refusal_reports_actual_pet_count() {
        let (db, service) = service().await;

        let created = service.create("Dogs").await.expect("create");
        let pets = PetRepo::new(&db);
        for name in ["Balu", "Rex", "Fido"] {
            pets.insert(name, "available", Some(created.id))
                .await
                .expect("pet insert");
        }

        let err = service.delete(created.id).await.expect_err("has pets");
        assert_eq!(err.details().expect("details")["petCount"], 3);
    }

    #[tokio::test]
    async fn test_get_with_pets() {
        let (db, service) = service().await;

        let created = service.create("Dogs").await.expect("create");
        let pets = PetRepo::new(&db);
        pets.insert("Balu", "available", Some(created.id))
            .await
            .expect("insert");
        pets.insert("Rex", "sold", Some(created.id))
            .await
            .expect("insert");

        let with_pets = service.get_with_pets(created.id).await.expect("get");
        assert_eq!(with_pets.name, "Dogs");
        assert_eq!(with_pets.pets.len(), 2);
        // Newest first, no nested category inside the embedding.
        assert_eq!(with_pets.pets[0].name, "Rex");
        assert!(with_pets.pets[0].category.is_none());
    }

    #[tokio::test]
    async fn test_list_ordered_by_name() {
        let (_db, service) = service().await;

        service.create("Zebras").await.expect("create");
        service.create("Ants").await.expect("create");

        let names: Vec<String> = service
            .list()
            .await
            .expect("list")
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Ants", "Zebras"]);
    }
}
