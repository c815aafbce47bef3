//! Editor API endpoints. All of these sit behind the admin gate.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{error, success, ApiResult};
use crate::editor::{AccessibilityReport, EditorUpdate, EditorView, MarkdownExport, Snapshot};
use crate::models::Post;
use crate::AppState;

/// Request body for adding a tag.
#[derive(Debug, Deserialize)]
pub struct TagRequest {
    pub tag: String,
}

/// Query parameters of a cover upload.
#[derive(Debug, Deserialize)]
pub struct CoverQuery {
    pub filename: String,
}

/// Outcome of an explicit draft flush.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftStatus {
    pub persisted: bool,
}

/// GET /api/editor - Current editor state.
pub async fn get_editor(State(state): State<AppState>) -> ApiResult<EditorView> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    success(state.editor.view().await, revision_id)
}

/// PATCH /api/editor - Update any of title, excerpt, category, tags and content.
pub async fn update_editor(
    State(state): State<AppState>,
    Json(update): Json<EditorUpdate>,
) -> ApiResult<EditorView> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.editor.update(update).await {
        Ok(view) => success(view, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/editor/tags - Add a tag.
pub async fn add_tag(
    State(state): State<AppState>,
    Json(request): Json<TagRequest>,
) -> ApiResult<EditorView> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.editor.add_tag(&request.tag).await {
        Ok(view) => success(view, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/editor/tags/:tag - Remove a tag.
pub async fn remove_tag(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> ApiResult<EditorView> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.editor.remove_tag(&tag).await {
        Ok(view) => success(view, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/editor/cover?filename= - Attach a cover image (raw request body).
pub async fn upload_cover(
    State(state): State<AppState>,
    Query(query): Query<CoverQuery>,
    body: Bytes,
) -> ApiResult<EditorView> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.editor.attach_cover(&query.filename, body).await {
        Ok(view) => success(view, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/editor/cover - Drop the pending cover image.
pub async fn remove_cover(State(state): State<AppState>) -> ApiResult<EditorView> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.editor.remove_cover().await {
        Ok(view) => success(view, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/editor/history - Content snapshots, oldest first.
pub async fn get_history(State(state): State<AppState>) -> ApiResult<Vec<Snapshot>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    success(state.editor.history().await, revision_id)
}

/// POST /api/editor/history/:index/restore - Put a snapshot's content back.
pub async fn restore_snapshot(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> ApiResult<EditorView> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.editor.restore(index).await {
        Ok(view) => success(view, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/editor/draft - Persist the draft now instead of waiting for autosave.
pub async fn flush_draft(State(state): State<AppState>) -> ApiResult<DraftStatus> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    let persisted = state.editor.flush_draft().await;
    success(DraftStatus { persisted }, revision_id)
}

/// POST /api/editor/save - Publish the editor contents as a new post.
pub async fn save_post(State(state): State<AppState>) -> ApiResult<Post> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.editor.save().await {
        Ok(post) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(post, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/editor/export - Download the content as markdown.
pub async fn export_markdown(State(state): State<AppState>) -> Response {
    let export = state.editor.export_markdown().await;
    markdown_attachment(export)
}

/// GET /api/editor/accessibility - Count images lacking alt text.
pub async fn check_accessibility(State(state): State<AppState>) -> ApiResult<AccessibilityReport> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    success(state.editor.check_accessibility().await, revision_id)
}

fn markdown_attachment(export: MarkdownExport) -> Response {
    let disposition = format!(
        "attachment; filename=\"{}\"",
        header_safe_filename(&export.filename)
    );
    let disposition = HeaderValue::from_str(&disposition)
        .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=\"post.md\""));

    (
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/markdown; charset=utf-8"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.body,
    )
        .into_response()
}

/// Replace characters that cannot appear in a quoted header parameter.
fn header_safe_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_graphic() && c != '"' && c != '\\' || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
