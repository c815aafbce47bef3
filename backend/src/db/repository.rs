//! Database repository for posts and the draft slot.
//!
//! Uses prepared statements for all reads and writes.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};

use crate::editor::{DraftStore, PostStore};
use crate::errors::AppError;
use crate::models::{Draft, NewPost, Post, RevisionInfo, TagSet};

/// Key of the single durable draft slot.
pub const DRAFT_SLOT: &str = "draft";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the current revision ID.
    pub async fn get_revision_id(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("revision_id"))
    }

    /// Get revision info.
    pub async fn get_revision_info(&self) -> Result<RevisionInfo, AppError> {
        let row = sqlx::query("SELECT revision_id, generated_at FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(RevisionInfo {
            revision_id: row.get("revision_id"),
            generated_at: row.get("generated_at"),
        })
    }

    // ==================== POST OPERATIONS ====================

    /// List all posts, newest first.
    pub async fn list_posts(&self) -> Result<Vec<Post>, AppError> {
        let rows = sqlx::query(
            "SELECT id, title, excerpt, category, tags, content, image_url, created_at FROM posts ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(post_from_row).collect())
    }

    /// Get a post by ID.
    pub async fn get_post(&self, id: &str) -> Result<Option<Post>, AppError> {
        let row = sqlx::query(
            "SELECT id, title, excerpt, category, tags, content, image_url, created_at FROM posts WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(post_from_row))
    }

    /// Create a new post. Posts are immutable once written.
    pub async fn create_post(&self, post: &NewPost) -> Result<Post, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = timestamp();
        let tags_json = serde_json::to_string(post.tags.as_slice())?;

        // The post and the revision bump commit together or not at all
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO posts (id, title, excerpt, category, tags, content, image_url, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&post.title)
        .bind(&post.excerpt)
        .bind(post.category.as_str())
        .bind(&tags_json)
        .bind(&post.content)
        .bind(&post.image_url)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        increment_revision(&mut tx, &now).await?;
        tx.commit().await?;

        Ok(Post {
            id,
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            category: post.category,
            tags: post.tags.clone(),
            content: post.content.clone(),
            image_url: post.image_url.clone(),
            created_at: now,
        })
    }

    // ==================== DRAFT OPERATIONS ====================

    /// Write the draft into the slot, replacing any previous one.
    pub async fn save_draft(&self, draft: &Draft) -> Result<(), AppError> {
        let payload = serde_json::to_string(draft)?;
        sqlx::query(
            "INSERT INTO drafts (slot, payload, updated_at) VALUES (?, ?, ?) ON CONFLICT(slot) DO UPDATE SET payload = excluded.payload, updated_at = excluded.updated_at",
        )
        .bind(DRAFT_SLOT)
        .bind(&payload)
        .bind(timestamp())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Read the draft slot. Absent, unreadable and malformed slots all yield `None`.
    pub async fn load_draft(&self) -> Option<Draft> {
        let row = match sqlx::query("SELECT payload FROM drafts WHERE slot = ?")
            .bind(DRAFT_SLOT)
            .fetch_optional(&self.pool)
            .await
        {
            Ok(row) => row?,
            Err(e) => {
                tracing::warn!("Failed to read draft slot: {}", e);
                return None;
            }
        };

        let payload: String = row.get("payload");
        match serde_json::from_str(&payload) {
            Ok(draft) => Some(draft),
            Err(e) => {
                tracing::debug!("Ignoring malformed draft: {}", e);
                None
            }
        }
    }

    /// Remove the draft slot.
    pub async fn clear_draft(&self) -> Result<(), AppError> {
        sqlx::query("DELETE FROM drafts WHERE slot = ?")
            .bind(DRAFT_SLOT)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl PostStore for Repository {
    async fn create_post(&self, post: &NewPost) -> Result<Post, AppError> {
        Repository::create_post(self, post).await
    }
}

#[async_trait]
impl DraftStore for Repository {
    async fn save_draft(&self, draft: &Draft) -> Result<(), AppError> {
        Repository::save_draft(self, draft).await
    }

    async fn load_draft(&self) -> Option<Draft> {
        Repository::load_draft(self).await
    }

    async fn clear_draft(&self) -> Result<(), AppError> {
        Repository::clear_draft(self).await
    }
}

/// Increment the revision ID inside a transaction and return the new value.
async fn increment_revision(
    tx: &mut Transaction<'_, Sqlite>,
    now: &str,
) -> Result<i64, AppError> {
    let row = sqlx::query(
        "UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1 RETURNING revision_id",
    )
    .bind(now)
    .fetch_optional(&mut **tx)
    .await?;

    row.map(|r| r.get("revision_id"))
        .ok_or_else(|| AppError::Database("Revision counter is missing".to_string()))
}

// Helper functions for row conversion

fn post_from_row(row: &sqlx::sqlite::SqliteRow) -> Post {
    let category: String = row.get("category");
    let tags_str: String = row.get("tags");
    Post {
        id: row.get("id"),
        title: row.get("title"),
        excerpt: row.get("excerpt"),
        category: category.parse().unwrap_or_default(),
        tags: TagSet::from(parse_json_array(&tags_str)),
        content: row.get("content"),
        image_url: row.get("image_url"),
        created_at: row.get("created_at"),
    }
}

fn parse_json_array(s: &str) -> Vec<String> {
    serde_json::from_str(s).unwrap_or_default()
}

/// Fixed-width RFC 3339 so stored timestamps sort lexically.
fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
