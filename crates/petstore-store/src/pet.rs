//! Pet repository.
//!
//! Reads that need the referenced category come back as
//! [`PetWithCategoryRow`] via a LEFT JOIN: a snapshot of the category at
//! read time, never a cascade.

use sqlx::SqlitePool;

use crate::db::Database;
use crate::error::{StoreError, StoreResult};

/// A pet row as stored.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PetRow {
    /// Generated id.
    pub id: i64,
    /// Pet name.
    pub name: String,
    /// Status string (`available`, `pending`, `sold`).
    pub status: String,
    /// Referenced category id, if any.
    pub category_id: Option<i64>,
}

/// A pet row joined with its category snapshot.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PetWithCategoryRow {
    /// Generated id.
    pub id: i64,
    /// Pet name.
    pub name: String,
    /// Status string.
    pub status: String,
    /// Referenced category id, if any.
    pub category_id: Option<i64>,
    /// Referenced category name, if any.
    pub category_name: Option<String>,
}

const JOINED_SELECT: &str = "\
SELECT p.id, p.name, p.status, p.category_id, c.name AS category_name \
FROM pets p LEFT JOIN categories c ON c.id = p.category_id";

/// Storage access for pets.
#[derive(Debug, Clone)]
pub struct PetRepo {
    pool: SqlitePool,
}

impl PetRepo {
    /// Creates a repository over the given database.
    #[must_use]
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    /// Inserts a new pet.
    ///
    /// A dangling category reference surfaces as a foreign-key violation.
    pub async fn insert(
        &self,
        name: &str,
        status: &str,
        category_id: Option<i64>,
    ) -> StoreResult<PetRow> {
        let row = sqlx::query_as::<_, PetRow>(
            "INSERT INTO pets (name, status, category_id) VALUES (?, ?, ?) \
             RETURNING id, name, status, category_id",
        )
        .bind(name)
        .bind(status)
        .bind(category_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Looks up a pet by id, joined with its category.
    pub async fn find_by_id(&self, id: i64) -> StoreResult<Option<PetWithCategoryRow>> {
        let sql = format!("{JOINED_SELECT} WHERE p.id = ?");
        let row = sqlx::query_as::<_, PetWithCategoryRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Returns pets with the given status, newest-first, joined with
    /// their categories.
    pub async fn find_by_status(&self, status: &str) -> StoreResult<Vec<PetWithCategoryRow>> {
        let sql = format!("{JOINED_SELECT} WHERE p.status = ? ORDER BY p.id DESC");
        let rows = sqlx::query_as::<_, PetWithCategoryRow>(&sql)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Returns all pets, newest-first, joined with their categories.
    pub async fn list_all(&self) -> StoreResult<Vec<PetWithCategoryRow>> {
        let sql = format!("{JOINED_SELECT} ORDER BY p.id DESC");
        let rows = sqlx::query_as::<_, PetWithCategoryRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Writes the full field set of a pet.
    ///
    /// The service layer merges the patch with current state before calling
    /// this. [`StoreError::RowNotFound`] if the id vanished between read
    /// and write.
    pub async fn update(
        &self,
        id: i64,
        name: &str,
        status: &str,
        category_id: Option<i64>,
    ) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE pets SET name = ?, status = ?, category_id = ? WHERE id = ?",
        )
        .bind(name)
        .bind(status)
        .bind(category_id)
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::RowNotFound);
        }
        Ok(())
    }

    /// Deletes a pet. [`StoreError::RowNotFound`] if the id is gone.
    pub async fn delete(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM pets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::RowNotFound);
        }
        Ok(())
    }
}
