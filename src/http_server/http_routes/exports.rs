use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};

use crate::http_server::{
    auth::AuthenticatedUser,
    error::ApiResult,
    response::success_message,
    state::AppState,
    validator::{ExportPlaylistPayload, ValidatedJson},
};

/// Accepts the export; the worker consuming the queue does the sending.
pub async fn post_export_playlist(
    State(state): State<Arc<AppState>>,
    Path(playlist_id): Path<String>,
    user: AuthenticatedUser,
    ValidatedJson(payload): ValidatedJson<ExportPlaylistPayload>,
) -> ApiResult<Response> {
    state
        .export_service()
        .request_playlist_export(&user.user_id, &playlist_id, &payload.target_email)
        .await?;

    Ok(success_message(
        StatusCode::CREATED,
        "Your request is being processed",
    ))
}
