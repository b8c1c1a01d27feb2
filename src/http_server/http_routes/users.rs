use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Response};
use serde_json::json;

use crate::http_server::{
    error::ApiResult,
    response::success_data,
    state::AppState,
    validator::{UserPayload, ValidatedJson},
};

pub async fn post_user(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<UserPayload>,
) -> ApiResult<Response> {
    let user_id = state
        .user_service()
        .add_user(payload.username, payload.fullname)
        .await?;

    Ok(success_data(
        StatusCode::CREATED,
        json!({ "userId": user_id }),
    ))
}
