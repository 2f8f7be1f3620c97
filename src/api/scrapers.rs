//! Scraper API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{validate_collection, ScraperDraft, ScraperItem};
use crate::AppState;

/// GET /api/scrapers - List all scrapers.
pub async fn list_scrapers(State(state): State<AppState>) -> ApiResult<Vec<ScraperItem>> {
    state.scrapers.load().await;
    success(state.scrapers.snapshot().await.items)
}

/// POST /api/scrapers - Add a scraper under a fresh id.
pub async fn create_scraper(
    State(state): State<AppState>,
    Json(draft): Json<ScraperDraft>,
) -> ApiResult<ScraperItem> {
    draft.validate()?;

    match state.scrapers.add(draft.into_item(None)).await {
        Some(item) => success(item),
        None => Err(AppError::Store("Failed to add scraper".to_string())),
    }
}

/// PUT /api/scrapers - Replace the whole collection.
pub async fn replace_scrapers(
    State(state): State<AppState>,
    Json(items): Json<Vec<ScraperItem>>,
) -> ApiResult<Vec<ScraperItem>> {
    validate_collection(&items)?;

    if state.scrapers.replace(items.clone()).await {
        success(items)
    } else {
        Err(AppError::Store("Failed to save scrapers".to_string()))
    }
}

/// PUT /api/scrapers/{id} - Overwrite a scraper, keeping its id.
pub async fn update_scraper(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<ScraperDraft>,
) -> ApiResult<ScraperItem> {
    draft.validate()?;

    let item = draft.into_item(Some(id));
    if state.scrapers.edit(item.clone()).await {
        success(item)
    } else {
        Err(AppError::Store("Failed to update scraper".to_string()))
    }
}

/// DELETE /api/scrapers/{id} - Delete a scraper.
pub async fn delete_scraper(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    if state.scrapers.remove(&id).await {
        success(())
    } else {
        Err(AppError::Store("Failed to delete scraper".to_string()))
    }
}
