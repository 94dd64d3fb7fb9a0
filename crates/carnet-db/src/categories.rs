//! Category repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use uuid::Uuid;

use carnet_core::{
    new_v7, Category, CategoryRepository, CreateCategoryRequest, Error, Result,
    UpdateCategoryRequest,
};

/// Map a unique-constraint violation on the category name to a
/// user-visible duplicate error. This is the second line of defense behind
/// the service-layer pre-check; it catches concurrent inserts racing past
/// the pre-check.
fn map_unique_violation(err: sqlx::Error, name: &str) -> Error {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return Error::DuplicateCategoryName(name.to_string());
        }
    }
    Error::Database(err)
}

/// PostgreSQL implementation of CategoryRepository.
#[derive(Clone)]
pub struct PgCategoryRepository {
    pool: Pool<Postgres>,
}

impl PgCategoryRepository {
    /// Create a new PgCategoryRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> Category {
        Category {
            id: row.get("id"),
            name: row.get("name"),
            color: row.get("color"),
            created_at_utc: row.get("created_at_utc"),
        }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn insert(&self, req: CreateCategoryRequest) -> Result<Category> {
        let id = new_v7();
        let now = Utc::now();

        sqlx::query("INSERT INTO category (id, name, color, created_at_utc) VALUES ($1, $2, $3, $4)")
            .bind(id)
            .bind(&req.name)
            .bind(&req.color)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, &req.name))?;

        Ok(Category {
            id,
            name: req.name,
            color: req.color,
            created_at_utc: now,
        })
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Category>> {
        let row = sqlx::query("SELECT id, name, color, created_at_utc FROM category WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.as_ref().map(Self::map_row))
    }

    async fn fetch_by_name(&self, name: &str) -> Result<Option<Category>> {
        let row =
            sqlx::query("SELECT id, name, color, created_at_utc FROM category WHERE name = $1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(Error::Database)?;
        Ok(row.as_ref().map(Self::map_row))
    }

    async fn list(&self) -> Result<Vec<Category>> {
        let rows =
            sqlx::query("SELECT id, name, color, created_at_utc FROM category ORDER BY name")
                .fetch_all(&self.pool)
                .await
                .map_err(Error::Database)?;
        Ok(rows.iter().map(Self::map_row).collect())
    }

    async fn update(&self, id: Uuid, req: UpdateCategoryRequest) -> Result<Option<Category>> {
        if req.name.is_none() && req.color.is_none() {
            // Nothing to apply; report the current row.
            return self.fetch(id).await;
        }

        let mut updates: Vec<String> = Vec::new();
        let mut param_idx = 2;

        if req.name.is_some() {
            updates.push(format!("name = ${}", param_idx));
            param_idx += 1;
        }
        if req.color.is_some() {
            updates.push(format!("color = ${}", param_idx));
        }

        let query = format!("UPDATE category SET {} WHERE id = $1", updates.join(", "));

        let mut q = sqlx::query(&query).bind(id);
        if let Some(name) = &req.name {
            q = q.bind(name);
        }
        if let Some(color) = &req.color {
            q = q.bind(color);
        }

        let result = q
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, req.name.as_deref().unwrap_or_default()))?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.fetch(id).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        // Membership rows cascade with the category.
        let result = sqlx::query("DELETE FROM category WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
