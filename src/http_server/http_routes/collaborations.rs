use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Response};
use serde_json::json;

use crate::http_server::{
    auth::AuthenticatedUser,
    error::ApiResult,
    response::{success_data, success_message},
    state::AppState,
    validator::{CollaborationPayload, ValidatedJson},
};

pub async fn post_collaboration(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    ValidatedJson(payload): ValidatedJson<CollaborationPayload>,
) -> ApiResult<Response> {
    state
        .playlist_service()
        .verify_playlist_owner(&payload.playlist_id, &user.user_id)
        .await?;
    let collaboration_id = state
        .collaboration_service()
        .add_collaboration(&payload.playlist_id, &payload.user_id)
        .await?;

    Ok(success_data(
        StatusCode::CREATED,
        json!({ "collaborationId": collaboration_id }),
    ))
}

pub async fn delete_collaboration(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    ValidatedJson(payload): ValidatedJson<CollaborationPayload>,
) -> ApiResult<Response> {
    state
        .playlist_service()
        .verify_playlist_owner(&payload.playlist_id, &user.user_id)
        .await?;
    state
        .collaboration_service()
        .delete_collaboration(&payload.playlist_id, &payload.user_id)
        .await?;

    Ok(success_message(StatusCode::OK, "Collaboration deleted"))
}
