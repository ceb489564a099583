//! MailChimp member handlers

use axum::{
    Json,
    extract::{Path, State},
};
use mailsync_core::MailChimpMember;
use serde_json::{Value, json};

use crate::error::ApiResult;
use crate::extract::JsonObject;
use crate::state::AppState;

/// POST /mailchimp/lists/{list_id}/members
pub async fn create(
    State(state): State<AppState>,
    Path(list_id): Path<String>,
    JsonObject(input): JsonObject,
) -> ApiResult<Json<MailChimpMember>> {
    let member = state.members.create(Some(&list_id), input).await?;
    Ok(Json(member))
}

/// GET /mailchimp/lists/{list_id}/members/{member_id}
pub async fn show(
    State(state): State<AppState>,
    Path((list_id, member_id)): Path<(String, String)>,
) -> ApiResult<Json<MailChimpMember>> {
    let member = state.members.read(Some(&list_id), &member_id).await?;
    Ok(Json(member))
}

/// PUT /mailchimp/lists/{list_id}/members/{member_id} (merge-patch)
pub async fn update(
    State(state): State<AppState>,
    Path((list_id, member_id)): Path<(String, String)>,
    JsonObject(patch): JsonObject,
) -> ApiResult<Json<MailChimpMember>> {
    let member = state
        .members
        .update(Some(&list_id), &member_id, patch)
        .await?;
    Ok(Json(member))
}

/// DELETE /mailchimp/lists/{list_id}/members/{member_id}
pub async fn remove(
    State(state): State<AppState>,
    Path((list_id, member_id)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    state.members.delete(Some(&list_id), &member_id).await?;
    Ok(Json(json!({})))
}
