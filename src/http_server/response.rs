use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

/// `{status: "success", data}`
pub fn success_data(status: StatusCode, data: impl Serialize) -> Response {
    (status, Json(json!({ "status": "success", "data": data }))).into_response()
}

/// `{status: "success", message}`
pub fn success_message(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({ "status": "success", "message": message })),
    )
        .into_response()
}
