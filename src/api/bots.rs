//! WhatsApp bot API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{validate_collection, BotDraft, BotItem};
use crate::AppState;

/// GET /api/bots - List all bots.
pub async fn list_bots(State(state): State<AppState>) -> ApiResult<Vec<BotItem>> {
    state.bots.load().await;
    success(state.bots.snapshot().await.items)
}

/// POST /api/bots - Add a bot under a fresh id.
pub async fn create_bot(
    State(state): State<AppState>,
    Json(draft): Json<BotDraft>,
) -> ApiResult<BotItem> {
    draft.validate()?;

    match state.bots.add(draft.into_item(None)).await {
        Some(item) => success(item),
        None => Err(AppError::Store("Failed to add WhatsApp Bot".to_string())),
    }
}

/// PUT /api/bots - Replace the whole collection.
pub async fn replace_bots(
    State(state): State<AppState>,
    Json(items): Json<Vec<BotItem>>,
) -> ApiResult<Vec<BotItem>> {
    validate_collection(&items)?;

    if state.bots.replace(items.clone()).await {
        success(items)
    } else {
        Err(AppError::Store("Failed to save WhatsApp Bots".to_string()))
    }
}

/// PUT /api/bots/{id} - Overwrite a bot, keeping its id.
pub async fn update_bot(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<BotDraft>,
) -> ApiResult<BotItem> {
    draft.validate()?;

    let item = draft.into_item(Some(id));
    if state.bots.edit(item.clone()).await {
        success(item)
    } else {
        Err(AppError::Store("Failed to update WhatsApp Bot".to_string()))
    }
}

/// DELETE /api/bots/{id} - Delete a bot.
pub async fn delete_bot(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    if state.bots.remove(&id).await {
        success(())
    } else {
        Err(AppError::Store("Failed to delete WhatsApp Bot".to_string()))
    }
}
