//! Note business logic: validation, not-found translation, and the
//! two-step category membership checks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use carnet_core::{
    validate_note_content, validate_note_title, CategoryRepository, CreateNoteRequest, Error,
    ListNotesRequest, Note, NoteRepository, Result, UpdateNoteRequest,
};
use carnet_db::Database;

use super::category_service::CategoryResponse;

/// Request body for creating a note.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct CreateNoteDto {
    pub title: String,
    pub content: String,
}

/// Request body for updating a note; all fields optional.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateNoteDto {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Note as returned by the API, with its categories in join order.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct NoteResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub categories: Vec<CategoryResponse>,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            title: note.title,
            content: note.content,
            is_archived: note.archived,
            created_at: note.created_at_utc,
            updated_at: note.updated_at_utc,
            categories: note.categories.into_iter().map(Into::into).collect(),
        }
    }
}

/// Service for note operations.
#[derive(Clone)]
pub struct NoteService {
    db: Database,
}

impl NoteService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create(&self, dto: CreateNoteDto) -> Result<NoteResponse> {
        validate_note_title(&dto.title).map_err(Error::InvalidInput)?;
        validate_note_content(&dto.content).map_err(Error::InvalidInput)?;

        let note = self
            .db
            .notes
            .insert(CreateNoteRequest {
                title: dto.title,
                content: dto.content,
            })
            .await?;
        Ok(note.into())
    }

    pub async fn list(
        &self,
        archived: Option<bool>,
        category_id: Option<Uuid>,
    ) -> Result<Vec<NoteResponse>> {
        let notes = self
            .db
            .notes
            .list(ListNotesRequest {
                archived,
                category_id,
            })
            .await?;
        Ok(notes.into_iter().map(Into::into).collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<NoteResponse> {
        let note = self
            .db
            .notes
            .fetch(id)
            .await?
            .ok_or(Error::NoteNotFound(id))?;
        Ok(note.into())
    }

    pub async fn update(&self, id: Uuid, dto: UpdateNoteDto) -> Result<NoteResponse> {
        if let Some(title) = &dto.title {
            validate_note_title(title).map_err(Error::InvalidInput)?;
        }
        if let Some(content) = &dto.content {
            validate_note_content(content).map_err(Error::InvalidInput)?;
        }

        let note = self
            .db
            .notes
            .update(
                id,
                UpdateNoteRequest {
                    title: dto.title,
                    content: dto.content,
                },
            )
            .await?
            .ok_or(Error::NoteNotFound(id))?;
        Ok(note.into())
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if !self.db.notes.delete(id).await? {
            return Err(Error::NoteNotFound(id));
        }
        Ok(())
    }

    pub async fn archive(&self, id: Uuid) -> Result<NoteResponse> {
        self.set_archived(id, true).await
    }

    pub async fn unarchive(&self, id: Uuid) -> Result<NoteResponse> {
        self.set_archived(id, false).await
    }

    async fn set_archived(&self, id: Uuid, archived: bool) -> Result<NoteResponse> {
        let note = self
            .db
            .notes
            .set_archived(id, archived)
            .await?
            .ok_or(Error::NoteNotFound(id))?;
        Ok(note.into())
    }

    /// Attach a category to a note. The category is resolved first, then
    /// the note; both must exist before the membership mutation runs.
    pub async fn add_category(&self, id: Uuid, category_id: Uuid) -> Result<NoteResponse> {
        self.db
            .categories
            .fetch(category_id)
            .await?
            .ok_or(Error::CategoryNotFound(category_id))?;

        let note = self
            .db
            .notes
            .add_category(id, category_id)
            .await?
            .ok_or(Error::NoteNotFound(id))?;
        Ok(note.into())
    }

    /// Detach a category from a note; same two-step existence checks as
    /// [`Self::add_category`].
    pub async fn remove_category(&self, id: Uuid, category_id: Uuid) -> Result<NoteResponse> {
        self.db
            .categories
            .fetch(category_id)
            .await?
            .ok_or(Error::CategoryNotFound(category_id))?;

        let note = self
            .db
            .notes
            .remove_category(id, category_id)
            .await?
            .ok_or(Error::NoteNotFound(id))?;
        Ok(note.into())
    }
}
