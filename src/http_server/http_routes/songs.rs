use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::entities;
use crate::http_server::{
    error::ApiResult,
    response::{success_data, success_message},
    state::AppState,
    validator::{SongPayload, ValidatedJson},
};
use crate::services::song::NewSong;

#[derive(Debug, Deserialize)]
pub struct SongFilter {
    title: Option<String>,
    performer: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SongView {
    id: String,
    title: String,
    year: i32,
    performer: String,
    genre: String,
    duration: Option<i32>,
    album_id: Option<String>,
}

impl From<entities::song::Model> for SongView {
    fn from(song: entities::song::Model) -> Self {
        Self {
            id: song.id,
            title: song.title,
            year: song.year,
            performer: song.performer,
            genre: song.genre,
            duration: song.duration,
            album_id: song.album_id,
        }
    }
}

impl From<SongPayload> for NewSong {
    fn from(payload: SongPayload) -> Self {
        Self {
            title: payload.title,
            year: payload.year,
            genre: payload.genre,
            performer: payload.performer,
            duration: payload.duration,
            album_id: payload.album_id,
        }
    }
}

pub async fn post_song(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<SongPayload>,
) -> ApiResult<Response> {
    let song_id = state.song_service().add_song(payload.into()).await?;

    Ok(success_data(
        StatusCode::CREATED,
        json!({ "songId": song_id }),
    ))
}

pub async fn get_songs(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<SongFilter>,
) -> ApiResult<Response> {
    let songs = state
        .song_service()
        .get_songs(filter.title.as_deref(), filter.performer.as_deref())
        .await?;

    let songs: Vec<_> = songs
        .into_iter()
        .map(|song| json!({ "id": song.id, "title": song.title, "performer": song.performer }))
        .collect();

    Ok(success_data(StatusCode::OK, json!({ "songs": songs })))
}

pub async fn get_song_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let song = SongView::from(state.song_service().get_song_by_id(&id).await?);

    Ok(success_data(StatusCode::OK, json!({ "song": song })))
}

pub async fn put_song_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<SongPayload>,
) -> ApiResult<Response> {
    state
        .song_service()
        .edit_song_by_id(&id, payload.into())
        .await?;

    Ok(success_message(StatusCode::OK, "Song updated"))
}

pub async fn delete_song_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    state.song_service().delete_song_by_id(&id).await?;

    Ok(success_message(StatusCode::OK, "Song deleted"))
}
