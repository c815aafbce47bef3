//! Post editor: live session state, version history, draft autosave and publishing.
//!
//! [`EditorController`] owns the single [`EditorSession`] and talks to the
//! collaborators through the [`PostStore`], [`DraftStore`] and [`ImageStore`] seams.

mod history;
pub mod markup;
mod session;

pub use history::*;
pub use session::*;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::errors::AppError;
use crate::models::{Draft, NewPost, Post};

/// Destination of published posts.
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn create_post(&self, post: &NewPost) -> Result<Post, AppError>;
}

/// The single durable draft slot.
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn save_draft(&self, draft: &Draft) -> Result<(), AppError>;
    /// Absent or unreadable drafts are reported as `None`, never as errors.
    async fn load_draft(&self) -> Option<Draft>;
    async fn clear_draft(&self) -> Result<(), AppError>;
}

/// Blob storage for cover images.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Reject filenames the store could never upload under.
    fn check_filename(&self, filename: &str) -> Result<(), AppError>;
    /// Store the bytes and return their public URL.
    async fn upload(&self, filename: &str, bytes: &[u8]) -> Result<String, AppError>;
    /// Delete an upload by the URL `upload` returned.
    async fn discard(&self, url: &str) -> Result<(), AppError>;
}

/// Orchestrates editing, autosave and publishing for the one editor instance.
pub struct EditorController {
    session: Mutex<EditorSession>,
    posts: Arc<dyn PostStore>,
    images: Arc<dyn ImageStore>,
    drafts: Arc<dyn DraftStore>,
}

impl EditorController {
    pub fn new(
        posts: Arc<dyn PostStore>,
        images: Arc<dyn ImageStore>,
        drafts: Arc<dyn DraftStore>,
    ) -> Self {
        Self {
            session: Mutex::new(EditorSession::new()),
            posts,
            images,
            drafts,
        }
    }

    /// Populate the session from the persisted draft, if any.
    pub async fn load_draft(&self) -> bool {
        let Some(draft) = self.drafts.load_draft().await else {
            return false;
        };
        self.session.lock().await.apply_draft(draft);
        tracing::info!("Restored editor draft");
        true
    }

    pub async fn view(&self) -> EditorView {
        self.session.lock().await.view()
    }

    pub async fn update(&self, update: EditorUpdate) -> Result<EditorView, AppError> {
        let mut session = self.session.lock().await;
        session.apply(update)?;
        Ok(session.view())
    }

    pub async fn add_tag(&self, tag: &str) -> Result<EditorView, AppError> {
        let mut session = self.session.lock().await;
        session.add_tag(tag)?;
        Ok(session.view())
    }

    pub async fn remove_tag(&self, tag: &str) -> Result<EditorView, AppError> {
        let mut session = self.session.lock().await;
        if !session.remove_tag(tag)? {
            return Err(AppError::NotFound(format!("Tag '{}' not found", tag)));
        }
        Ok(session.view())
    }

    /// Hold a cover image until the next save uploads it.
    pub async fn attach_cover(&self, filename: &str, bytes: Bytes) -> Result<EditorView, AppError> {
        self.images.check_filename(filename)?;
        if bytes.is_empty() {
            return Err(AppError::Validation("Image body is empty".to_string()));
        }

        let mut session = self.session.lock().await;
        session.set_cover(CoverImage {
            filename: filename.to_string(),
            bytes,
        })?;
        Ok(session.view())
    }

    pub async fn remove_cover(&self) -> Result<EditorView, AppError> {
        let mut session = self.session.lock().await;
        session.clear_cover()?;
        Ok(session.view())
    }

    pub async fn history(&self) -> Vec<Snapshot> {
        self.session.lock().await.history()
    }

    pub async fn restore(&self, index: usize) -> Result<EditorView, AppError> {
        let mut session = self.session.lock().await;
        session.restore(index)?;
        Ok(session.view())
    }

    pub async fn export_markdown(&self) -> MarkdownExport {
        self.session.lock().await.markdown_export()
    }

    pub async fn check_accessibility(&self) -> AccessibilityReport {
        self.session.lock().await.accessibility()
    }

    /// Persist the draft if it changed since the last flush.
    ///
    /// Best effort: a failed write is logged and retried on the next flush.
    /// The session stays locked for the write so a concurrent save cannot
    /// clear the slot underneath it.
    pub async fn flush_draft(&self) -> bool {
        let mut session = self.session.lock().await;
        let Some(draft) = session.take_dirty_draft() else {
            return false;
        };

        match self.drafts.save_draft(&draft).await {
            Ok(()) => {
                tracing::debug!("Draft autosaved");
                true
            }
            Err(e) => {
                tracing::warn!("Failed to autosave draft: {}", e);
                session.mark_dirty();
                false
            }
        }
    }

    /// Publish the current editor contents.
    ///
    /// Runs on its own task so the save finishes and the session leaves the
    /// saving phase even if the caller goes away.
    pub async fn save(self: &Arc<Self>) -> Result<Post, AppError> {
        let controller = Arc::clone(self);
        tokio::spawn(async move { controller.run_save().await })
            .await
            .map_err(|e| AppError::Internal(format!("Save task failed: {}", e)))?
    }

    async fn run_save(&self) -> Result<Post, AppError> {
        let pending = self.session.lock().await.begin_save()?;

        let outcome = self.publish(pending).await;

        let mut session = self.session.lock().await;
        match outcome {
            Ok(post) => {
                session.finish_save();
                if let Err(e) = self.drafts.clear_draft().await {
                    tracing::warn!("Post {} saved but draft was not cleared: {}", post.id, e);
                }
                tracing::info!("Published post {} ({})", post.id, post.title);
                Ok(post)
            }
            Err(e) => {
                session.abort_save();
                tracing::error!("Error saving post: {}", e);
                Err(e)
            }
        }
    }

    async fn publish(&self, pending: PendingSave) -> Result<Post, AppError> {
        let mut post = pending.post;
        if let Some(cover) = pending.cover {
            let url = self.images.upload(&cover.filename, &cover.bytes).await?;
            post.image_url = Some(url);
        }

        let result = self.posts.create_post(&post).await;
        if let (Err(_), Some(url)) = (&result, &post.image_url) {
            // A retry uploads a new copy
            if let Err(e) = self.images.discard(url).await {
                tracing::warn!("Orphaned cover image {}: {}", url, e);
            }
        }
        result
    }

    /// Periodically flush the draft in the background.
    pub fn spawn_autosave(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                controller.flush_draft().await;
            }
        })
    }
}
