//! Category business logic: uniqueness rules and not-found translation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use carnet_core::{
    validate_category_color, validate_category_name, Category, CategoryRepository,
    CreateCategoryRequest, Error, Result, UpdateCategoryRequest,
};
use carnet_db::Database;

/// Request body for creating a category.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct CreateCategoryDto {
    pub name: String,
    pub color: Option<String>,
}

/// Request body for updating a category; all fields optional.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateCategoryDto {
    pub name: Option<String>,
    pub color: Option<String>,
}

/// Category as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            color: category.color,
            created_at: category.created_at_utc,
        }
    }
}

/// Service for category operations.
#[derive(Clone)]
pub struct CategoryService {
    db: Database,
}

impl CategoryService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn validate(name: Option<&str>, color: Option<&str>) -> Result<()> {
        if let Some(name) = name {
            validate_category_name(name).map_err(Error::InvalidInput)?;
        }
        if let Some(color) = color {
            validate_category_color(color).map_err(Error::InvalidInput)?;
        }
        Ok(())
    }

    /// Create a category. The name is pre-checked for uniqueness; the
    /// repository's constraint mapping covers the concurrent-insert race,
    /// so both paths surface the same duplicate-name failure.
    pub async fn create(&self, dto: CreateCategoryDto) -> Result<CategoryResponse> {
        Self::validate(Some(&dto.name), dto.color.as_deref())?;

        if self.db.categories.fetch_by_name(&dto.name).await?.is_some() {
            return Err(Error::DuplicateCategoryName(dto.name));
        }

        let category = self
            .db
            .categories
            .insert(CreateCategoryRequest {
                name: dto.name,
                color: dto.color,
            })
            .await?;
        Ok(category.into())
    }

    pub async fn list(&self) -> Result<Vec<CategoryResponse>> {
        let categories = self.db.categories.list().await?;
        Ok(categories.into_iter().map(Into::into).collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<CategoryResponse> {
        let category = self
            .db
            .categories
            .fetch(id)
            .await?
            .ok_or(Error::CategoryNotFound(id))?;
        Ok(category.into())
    }

    /// Update a category. A supplied name must not belong to a *different*
    /// category; renaming a category to its own name is allowed.
    pub async fn update(&self, id: Uuid, dto: UpdateCategoryDto) -> Result<CategoryResponse> {
        Self::validate(dto.name.as_deref(), dto.color.as_deref())?;

        if let Some(name) = &dto.name {
            if let Some(existing) = self.db.categories.fetch_by_name(name).await? {
                if existing.id != id {
                    return Err(Error::DuplicateCategoryName(name.clone()));
                }
            }
        }

        let category = self
            .db
            .categories
            .update(
                id,
                UpdateCategoryRequest {
                    name: dto.name,
                    color: dto.color,
                },
            )
            .await?
            .ok_or(Error::CategoryNotFound(id))?;
        Ok(category.into())
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if !self.db.categories.delete(id).await? {
            return Err(Error::CategoryNotFound(id));
        }
        Ok(())
    }
}
