//! Public post API endpoints.

use axum::extract::{Path, Query, State};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::filter::{category_options, filter_posts, FilterCriteria, FilterQuery};
use crate::models::Post;
use crate::AppState;

/// GET /api/posts - List posts, optionally filtered by `search` and `category`.
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> ApiResult<Vec<Post>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let criteria = match FilterCriteria::try_from(query) {
        Ok(criteria) => criteria,
        Err(e) => return error(e, revision_id),
    };

    match state.repo.list_posts().await {
        Ok(posts) => {
            let filtered = filter_posts(&posts, &criteria).into_iter().cloned().collect();
            success(filtered, revision_id)
        }
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/posts/categories - Category options for the filter.
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_posts().await {
        Ok(posts) => success(category_options(&posts), revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/posts/:id - Get a single post.
pub async fn get_post(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Post> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_post(&id).await {
        Ok(Some(post)) => success(post, revision_id),
        Ok(None) => error(
            AppError::NotFound(format!("Post {} not found", id)),
            revision_id,
        ),
        Err(e) => error(e, revision_id),
    }
}
