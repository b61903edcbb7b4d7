//! Category repository.

use sqlx::SqlitePool;

use crate::db::Database;
use crate::error::{StoreError, StoreResult};
use crate::pet::PetRow;

/// A category row as stored.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CategoryRow {
    /// Generated id.
    pub id: i64,
    /// Unique name.
    pub name: String,
}

/// Storage access for categories.
#[derive(Debug, Clone)]
pub struct CategoryRepo {
    pool: SqlitePool,
}

impl CategoryRepo {
    /// Creates a repository over the given database.
    #[must_use]
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    /// Returns all categories, ordered by name ascending.
    pub async fn list_by_name(&self) -> StoreResult<Vec<CategoryRow>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name FROM categories ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Looks up a category by id.
    pub async fn find_by_id(&self, id: i64) -> StoreResult<Option<CategoryRow>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name FROM categories WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Looks up a category by exact name (case-sensitive).
    pub async fn find_by_name(&self, name: &str) -> StoreResult<Option<CategoryRow>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name FROM categories WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Inserts a new category.
    ///
    /// A duplicate name surfaces as a unique-constraint violation.
    pub async fn insert(&self, name: &str) -> StoreResult<CategoryRow> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "INSERT INTO categories (name) VALUES (?) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Renames a category. [`StoreError::RowNotFound`] if the id is gone.
    pub async fn update_name(&self, id: i64, name: &str) -> StoreResult<CategoryRow> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "UPDATE categories SET name = ? WHERE id = ? RETURNING id, name",
        )
        .bind(name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or(StoreError::RowNotFound)
    }

    /// Deletes a category. [`StoreError::RowNotFound`] if the id is gone.
    pub async fn delete(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::RowNotFound);
        }
        Ok(())
    }

    /// Counts the pets currently referencing a category.
    pub async fn pet_count(&self, id: i64) -> StoreResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM pets WHERE category_id = ?",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Returns the pets referencing a category, newest-first.
    pub async fn pets_in_category(&self, id: i64) -> StoreResult<Vec<PetRow>> {
        let rows = sqlx::query_as::<_, PetRow>(
            "SELECT id, name, status, category_id FROM pets \
             WHERE category_id = ? ORDER BY id DESC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
