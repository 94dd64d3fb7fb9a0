//! Core repository traits for carnet.
//!
//! These traits define the data-access interfaces that concrete
//! implementations must satisfy, enabling pluggable backends and
//! testability.
//!
//! Absent rows are reported as `Ok(None)` / `Ok(false)` sentinels; the
//! service layer is responsible for converting them into structured
//! not-found failures before they reach the API boundary.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Category, Note};

// =============================================================================
// NOTE REPOSITORY
// =============================================================================

/// Request for creating a new note.
#[derive(Debug, Clone)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: String,
}

/// Request for partially updating a note.
#[derive(Debug, Clone, Default)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Request for listing notes.
#[derive(Debug, Clone, Default)]
pub struct ListNotesRequest {
    /// Filter by archived status; `None` returns all notes.
    pub archived: Option<bool>,
    /// Restrict to notes joined to this category.
    pub category_id: Option<Uuid>,
}

/// Repository for note CRUD and membership operations.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Insert a new note with `archived = false` and server timestamps.
    async fn insert(&self, req: CreateNoteRequest) -> Result<Note>;

    /// Fetch a note by ID with its categories eagerly loaded.
    async fn fetch(&self, id: Uuid) -> Result<Option<Note>>;

    /// List notes ordered by creation time descending.
    async fn list(&self, req: ListNotesRequest) -> Result<Vec<Note>>;

    /// Apply only the provided fields; re-stamps `updated_at_utc`.
    async fn update(&self, id: Uuid, req: UpdateNoteRequest) -> Result<Option<Note>>;

    /// Delete a note and its membership rows. Returns whether a row existed.
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Set the archived flag; re-stamps `updated_at_utc` even when the
    /// flag does not change.
    async fn set_archived(&self, id: Uuid, archived: bool) -> Result<Option<Note>>;

    /// Idempotent membership insert: adding an already-present category
    /// is a no-op. Returns `None` when the note is absent.
    async fn add_category(&self, id: Uuid, category_id: Uuid) -> Result<Option<Note>>;

    /// Idempotent membership delete: removing an absent category is a
    /// no-op. Returns `None` when the note is absent.
    async fn remove_category(&self, id: Uuid, category_id: Uuid) -> Result<Option<Note>>;
}

// =============================================================================
// CATEGORY REPOSITORY
// =============================================================================

/// Request for creating a new category.
#[derive(Debug, Clone)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub color: Option<String>,
}

/// Request for partially updating a category.
#[derive(Debug, Clone, Default)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub color: Option<String>,
}

/// Repository for category CRUD operations.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Insert a new category. A unique-constraint violation on the name
    /// surfaces as [`crate::Error::DuplicateCategoryName`], not as a raw
    /// database error.
    async fn insert(&self, req: CreateCategoryRequest) -> Result<Category>;

    /// Fetch a category by ID.
    async fn fetch(&self, id: Uuid) -> Result<Option<Category>>;

    /// Fetch a category by exact name.
    async fn fetch_by_name(&self, name: &str) -> Result<Option<Category>>;

    /// List all categories ordered by name ascending.
    async fn list(&self) -> Result<Vec<Category>>;

    /// Apply only the provided fields. Rename collisions map to
    /// [`crate::Error::DuplicateCategoryName`] like inserts.
    async fn update(&self, id: Uuid, req: UpdateCategoryRequest) -> Result<Option<Category>>;

    /// Delete a category; membership rows cascade. Returns whether it existed.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}
