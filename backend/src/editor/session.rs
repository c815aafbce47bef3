//! Live editor state and its save state machine.

use axum::body::Bytes;
use serde::{Deserialize, Serialize};

use super::history::{Snapshot, VersionHistory};
use super::markup;
use crate::errors::AppError;
use crate::models::{Category, Draft, NewPost, TagSet};

/// Content of a freshly reset editor.
pub const BLANK_CONTENT: &str = "<h2>New Post</h2><p>Start writing your post here...</p>";

/// Where the editor is in a save attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EditorPhase {
    Editing,
    Saving,
}

/// Cover image waiting to be uploaded with the next save.
#[derive(Debug, Clone)]
pub struct CoverImage {
    pub filename: String,
    pub bytes: Bytes,
}

/// Partial update of the editor fields. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Everything a save needs, captured when the save starts.
#[derive(Debug, Clone)]
pub struct PendingSave {
    pub post: NewPost,
    pub cover: Option<CoverImage>,
}

/// Markdown rendition of the current content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownExport {
    pub filename: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityReport {
    pub images_missing_alt: usize,
}

/// Serializable view of the editor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorView {
    pub title: String,
    pub excerpt: String,
    pub category: Category,
    pub tags: TagSet,
    pub content: String,
    pub phase: EditorPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_filename: Option<String>,
    pub word_count: usize,
    pub read_time_minutes: usize,
    pub unsaved_draft: bool,
    pub history_length: usize,
}

/// The single editor instance.
#[derive(Debug)]
pub struct EditorSession {
    title: String,
    excerpt: String,
    category: Category,
    tags: TagSet,
    content: String,
    cover: Option<CoverImage>,
    history: VersionHistory,
    phase: EditorPhase,
    dirty: bool,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorSession {
    pub fn new() -> Self {
        Self {
            title: String::new(),
            excerpt: String::new(),
            category: Category::Unset,
            tags: TagSet::new(),
            content: BLANK_CONTENT.to_string(),
            cover: None,
            history: VersionHistory::new(),
            phase: EditorPhase::Editing,
            dirty: false,
        }
    }

    pub fn phase(&self) -> EditorPhase {
        self.phase
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Load a persisted draft. An empty draft body keeps the current content.
    pub fn apply_draft(&mut self, draft: Draft) {
        self.title = draft.title;
        self.excerpt = draft.excerpt;
        self.category = draft.category;
        self.tags = draft.tags;
        if !draft.content.is_empty() {
            self.content = draft.content;
        }
    }

    /// The current state as it would be persisted.
    pub fn draft(&self) -> Draft {
        Draft {
            title: self.title.clone(),
            excerpt: self.excerpt.clone(),
            category: self.category,
            tags: self.tags.clone(),
            content: self.content().to_string(),
        }
    }

    /// Take the draft if it changed since the last call.
    pub fn take_dirty_draft(&mut self) -> Option<Draft> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(self.draft())
    }

    /// Flag the draft for persistence again, e.g. after a failed write.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn ensure_editing(&self) -> Result<(), AppError> {
        match self.phase {
            EditorPhase::Editing => Ok(()),
            EditorPhase::Saving => Err(AppError::Busy(
                "A save is in progress; try again when it completes".to_string(),
            )),
        }
    }

    /// Apply a partial update.
    pub fn apply(&mut self, update: EditorUpdate) -> Result<(), AppError> {
        self.ensure_editing()?;

        if let Some(title) = update.title {
            self.dirty |= title != self.title;
            self.title = title;
        }
        if let Some(excerpt) = update.excerpt {
            self.dirty |= excerpt != self.excerpt;
            self.excerpt = excerpt;
        }
        if let Some(category) = update.category {
            self.dirty |= category != self.category;
            self.category = category;
        }
        if let Some(tags) = update.tags {
            let tags = TagSet::from(tags);
            self.dirty |= tags != self.tags;
            self.tags = tags;
        }
        if let Some(content) = update.content {
            self.set_content(content)?;
        }
        Ok(())
    }

    /// Replace the content. Every change is recorded in the version history.
    pub fn set_content(&mut self, content: String) -> Result<(), AppError> {
        self.ensure_editing()?;
        if content == self.content {
            return Ok(());
        }
        self.history.record(&content);
        self.content = content;
        self.dirty = true;
        Ok(())
    }

    pub fn add_tag(&mut self, tag: &str) -> Result<bool, AppError> {
        self.ensure_editing()?;
        let added = self.tags.insert(tag);
        self.dirty |= added;
        Ok(added)
    }

    pub fn remove_tag(&mut self, tag: &str) -> Result<bool, AppError> {
        self.ensure_editing()?;
        let removed = self.tags.remove(tag);
        self.dirty |= removed;
        Ok(removed)
    }

    pub fn set_cover(&mut self, cover: CoverImage) -> Result<(), AppError> {
        self.ensure_editing()?;
        self.cover = Some(cover);
        Ok(())
    }

    pub fn clear_cover(&mut self) -> Result<bool, AppError> {
        self.ensure_editing()?;
        Ok(self.cover.take().is_some())
    }

    pub fn history(&self) -> Vec<Snapshot> {
        self.history.list()
    }

    /// Put a snapshot's content back. Only the content changes and the
    /// restore itself is not added to the history.
    pub fn restore(&mut self, index: usize) -> Result<(), AppError> {
        self.ensure_editing()?;
        let snapshot = self
            .history
            .get(index)
            .ok_or_else(|| AppError::NotFound(format!("Snapshot {} not found", index)))?;
        if snapshot.content != self.content {
            self.content = snapshot.content.clone();
            self.dirty = true;
        }
        Ok(())
    }

    /// Validate the required fields and enter the saving phase.
    pub fn begin_save(&mut self) -> Result<PendingSave, AppError> {
        self.ensure_editing()?;

        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.excerpt.trim().is_empty() {
            missing.push("excerpt");
        }
        if !self.category.is_set() {
            missing.push("category");
        }
        if !markup::has_visible_content(&self.content) {
            missing.push("content");
        }
        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        self.phase = EditorPhase::Saving;
        Ok(PendingSave {
            post: NewPost {
                title: self.title.trim().to_string(),
                excerpt: self.excerpt.trim().to_string(),
                category: self.category,
                tags: self.tags.clone(),
                content: self.content.clone(),
                image_url: None,
            },
            cover: self.cover.clone(),
        })
    }

    /// The post was stored: reset to a blank editor. History is kept.
    pub fn finish_save(&mut self) {
        self.title.clear();
        self.excerpt.clear();
        self.category = Category::Unset;
        self.tags = TagSet::new();
        self.content = BLANK_CONTENT.to_string();
        self.cover = None;
        self.dirty = false;
        self.phase = EditorPhase::Editing;
    }

    /// The save failed: return to editing with everything intact.
    pub fn abort_save(&mut self) {
        self.phase = EditorPhase::Editing;
    }

    pub fn markdown_export(&self) -> MarkdownExport {
        let stem = if self.title.is_empty() {
            "post"
        } else {
            self.title.as_str()
        };
        MarkdownExport {
            filename: format!("{}.md", stem),
            body: markup::to_markdown(&self.content),
        }
    }

    pub fn accessibility(&self) -> AccessibilityReport {
        AccessibilityReport {
            images_missing_alt: markup::count_images_missing_alt(&self.content),
        }
    }

    pub fn view(&self) -> EditorView {
        EditorView {
            title: self.title.clone(),
            excerpt: self.excerpt.clone(),
            category: self.category,
            tags: self.tags.clone(),
            content: self.content().to_string(),
            phase: self.phase(),
            cover_filename: self.cover.as_ref().map(|c| c.filename.clone()),
            word_count: markup::word_count(&self.content),
            read_time_minutes: markup::read_time_minutes(&self.content),
            unsaved_draft: self.is_dirty(),
            history_length: self.history.len(),
        }
    }
}
