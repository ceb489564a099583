//! MailChimp list handlers

use axum::{
    Json,
    extract::{Path, State},
};
use mailsync_core::MailChimpList;
use serde_json::{Value, json};

use crate::error::ApiResult;
use crate::extract::JsonObject;
use crate::state::AppState;

/// POST /mailchimp/lists
pub async fn create(
    State(state): State<AppState>,
    JsonObject(input): JsonObject,
) -> ApiResult<Json<MailChimpList>> {
    let list = state.lists.create(None, input).await?;
    Ok(Json(list))
}

/// GET /mailchimp/lists/{list_id}
pub async fn show(
    State(state): State<AppState>,
    Path(list_id): Path<String>,
) -> ApiResult<Json<MailChimpList>> {
    let list = state.lists.read(None, &list_id).await?;
    Ok(Json(list))
}

/// PUT /mailchimp/lists/{list_id} (merge-patch)
pub async fn update(
    State(state): State<AppState>,
    Path(list_id): Path<String>,
    JsonObject(patch): JsonObject,
) -> ApiResult<Json<MailChimpList>> {
    let list = state.lists.update(None, &list_id, patch).await?;
    Ok(Json(list))
}

/// DELETE /mailchimp/lists/{list_id}
///
/// Refused with 400 while the list still has members.
pub async fn remove(
    State(state): State<AppState>,
    Path(list_id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.lists.delete(None, &list_id).await?;
    Ok(Json(json!({})))
}
