//! Note repository implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, Pool, Postgres, Row, Transaction};
use uuid::Uuid;

use carnet_core::{
    new_v7, Category, CreateNoteRequest, Error, ListNotesRequest, Note, NoteRepository, Result,
    UpdateNoteRequest,
};

/// PostgreSQL implementation of NoteRepository.
#[derive(Clone)]
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    /// Create a new PgNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn map_note_row(row: &PgRow, categories: Vec<Category>) -> Note {
        Note {
            id: row.get("id"),
            title: row.get("title"),
            content: row.get("content"),
            archived: row.get("archived"),
            created_at_utc: row.get("created_at_utc"),
            updated_at_utc: row.get("updated_at_utc"),
            categories,
        }
    }

    fn map_category_row(row: &PgRow) -> Category {
        Category {
            id: row.get("id"),
            name: row.get("name"),
            color: row.get("color"),
            created_at_utc: row.get("created_at_utc"),
        }
    }

    async fn exists_tx(&self, tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM note WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut **tx)
            .await
            .map_err(Error::Database)?;
        Ok(exists)
    }

    /// Fetch a note and its categories inside an open transaction.
    async fn fetch_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Option<Note>> {
        let row = sqlx::query(
            "SELECT id, title, content, archived, created_at_utc, updated_at_utc
             FROM note WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(Error::Database)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let category_rows = sqlx::query(
            "SELECT c.id, c.name, c.color, c.created_at_utc
             FROM note_category nc
             JOIN category c ON c.id = nc.category_id
             WHERE nc.note_id = $1",
        )
        .bind(id)
        .fetch_all(&mut **tx)
        .await
        .map_err(Error::Database)?;

        let categories = category_rows.iter().map(Self::map_category_row).collect();
        Ok(Some(Self::map_note_row(&row, categories)))
    }
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn insert(&self, req: CreateNoteRequest) -> Result<Note> {
        let id = new_v7();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO note (id, title, content, archived, created_at_utc, updated_at_utc)
             VALUES ($1, $2, $3, false, $4, $4)",
        )
        .bind(id)
        .bind(&req.title)
        .bind(&req.content)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(Note {
            id,
            title: req.title,
            content: req.content,
            archived: false,
            created_at_utc: now,
            updated_at_utc: now,
            categories: Vec::new(),
        })
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Note>> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let result = self.fetch_tx(&mut tx, id).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(result)
    }

    async fn list(&self, req: ListNotesRequest) -> Result<Vec<Note>> {
        let mut query = String::from(
            "SELECT n.id, n.title, n.content, n.archived, n.created_at_utc, n.updated_at_utc
             FROM note n WHERE 1=1 ",
        );
        let mut param_idx = 1;

        if req.archived.is_some() {
            query.push_str(&format!("AND n.archived = ${} ", param_idx));
            param_idx += 1;
        }
        if req.category_id.is_some() {
            query.push_str(&format!(
                "AND EXISTS (SELECT 1 FROM note_category nc
                 WHERE nc.note_id = n.id AND nc.category_id = ${}) ",
                param_idx
            ));
        }
        query.push_str("ORDER BY n.created_at_utc DESC");

        let mut q = sqlx::query(&query);
        if let Some(archived) = req.archived {
            q = q.bind(archived);
        }
        if let Some(category_id) = req.category_id {
            q = q.bind(category_id);
        }

        let rows = q.fetch_all(&self.pool).await.map_err(Error::Database)?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        // Batch-load categories for every returned note in one query.
        let note_ids: Vec<Uuid> = rows.iter().map(|row| row.get("id")).collect();
        let category_rows = sqlx::query(
            "SELECT nc.note_id, c.id, c.name, c.color, c.created_at_utc
             FROM note_category nc
             JOIN category c ON c.id = nc.category_id
             WHERE nc.note_id = ANY($1)",
        )
        .bind(&note_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let mut by_note: HashMap<Uuid, Vec<Category>> = HashMap::new();
        for row in &category_rows {
            let note_id: Uuid = row.get("note_id");
            by_note
                .entry(note_id)
                .or_default()
                .push(Self::map_category_row(row));
        }

        let notes = rows
            .iter()
            .map(|row| {
                let id: Uuid = row.get("id");
                let categories = by_note.remove(&id).unwrap_or_default();
                Self::map_note_row(row, categories)
            })
            .collect();

        Ok(notes)
    }

    async fn update(&self, id: Uuid, req: UpdateNoteRequest) -> Result<Option<Note>> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        // $1 = now, $2 = id, dynamic params start at $3
        let mut updates: Vec<String> = vec!["updated_at_utc = $1".to_string()];
        let now = Utc::now();
        let mut param_idx = 3;

        if req.title.is_some() {
            updates.push(format!("title = ${}", param_idx));
            param_idx += 1;
        }
        if req.content.is_some() {
            updates.push(format!("content = ${}", param_idx));
        }

        let query = format!("UPDATE note SET {} WHERE id = $2", updates.join(", "));

        let mut q = sqlx::query(&query).bind(now).bind(id);
        if let Some(title) = &req.title {
            q = q.bind(title);
        }
        if let Some(content) = &req.content {
            q = q.bind(content);
        }

        let result = q.execute(&mut *tx).await.map_err(Error::Database)?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let note = self.fetch_tx(&mut tx, id).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(note)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        // Membership rows cascade with the note.
        let result = sqlx::query("DELETE FROM note WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_archived(&self, id: Uuid, archived: bool) -> Result<Option<Note>> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let result =
            sqlx::query("UPDATE note SET archived = $3, updated_at_utc = $1 WHERE id = $2")
                .bind(Utc::now())
                .bind(id)
                .bind(archived)
                .execute(&mut *tx)
                .await
                .map_err(Error::Database)?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let note = self.fetch_tx(&mut tx, id).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(note)
    }

    async fn add_category(&self, id: Uuid, category_id: Uuid) -> Result<Option<Note>> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        if !self.exists_tx(&mut tx, id).await? {
            return Ok(None);
        }

        sqlx::query(
            "INSERT INTO note_category (note_id, category_id) VALUES ($1, $2)
             ON CONFLICT (note_id, category_id) DO NOTHING",
        )
        .bind(id)
        .bind(category_id)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        let note = self.fetch_tx(&mut tx, id).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(note)
    }

    async fn remove_category(&self, id: Uuid, category_id: Uuid) -> Result<Option<Note>> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        if !self.exists_tx(&mut tx, id).await? {
            return Ok(None);
        }

        sqlx::query("DELETE FROM note_category WHERE note_id = $1 AND category_id = $2")
            .bind(id)
            .bind(category_id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        let note = self.fetch_tx(&mut tx, id).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(note)
    }
}
