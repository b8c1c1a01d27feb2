use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode},
    response::Response,
};
use serde::Serialize;
use serde_json::json;

use crate::entities;
use crate::http_server::{
    auth::AuthenticatedUser,
    error::ApiResult,
    response::{success_data, success_message},
    state::AppState,
    validator::{AlbumCoverPayload, AlbumPayload, ValidatedJson},
};
use crate::services::album::LikeToggle;

pub const DATA_SOURCE_HEADER: &str = "x-data-source";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AlbumView {
    id: String,
    name: String,
    year: i32,
    cover_url: Option<String>,
}

impl From<entities::album::Model> for AlbumView {
    fn from(album: entities::album::Model) -> Self {
        Self {
            id: album.id,
            name: album.name,
            year: album.year,
            cover_url: album.cover_url,
        }
    }
}

#[derive(Serialize)]
pub struct SongSummaryView {
    pub id: String,
    pub title: String,
    pub performer: String,
}

impl From<entities::song::Model> for SongSummaryView {
    fn from(song: entities::song::Model) -> Self {
        Self {
            id: song.id,
            title: song.title,
            performer: song.performer,
        }
    }
}

#[derive(Serialize)]
struct AlbumDetailView {
    #[serde(flatten)]
    album: AlbumView,
    songs: Vec<SongSummaryView>,
}

pub async fn post_album(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<AlbumPayload>,
) -> ApiResult<Response> {
    let album_id = state
        .album_service()
        .add_album(payload.name, payload.year, payload.cover_url)
        .await?;

    Ok(success_data(
        StatusCode::CREATED,
        json!({ "albumId": album_id }),
    ))
}

pub async fn get_albums(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let albums: Vec<AlbumView> = state
        .album_service()
        .get_albums()
        .await?
        .into_iter()
        .map(AlbumView::from)
        .collect();

    Ok(success_data(StatusCode::OK, json!({ "albums": albums })))
}

pub async fn get_album_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let found = state.album_service().get_album_by_id(&id).await?;

    let album = AlbumDetailView {
        album: found.album.into(),
        songs: found.songs.into_iter().map(SongSummaryView::from).collect(),
    };

    Ok(success_data(StatusCode::OK, json!({ "album": album })))
}

pub async fn put_album_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<AlbumPayload>,
) -> ApiResult<Response> {
    state
        .album_service()
        .edit_album_by_id(&id, payload.name, payload.year)
        .await?;

    Ok(success_message(StatusCode::OK, "Album updated"))
}

pub async fn delete_album_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    state.album_service().delete_album_by_id(&id).await?;

    Ok(success_message(StatusCode::OK, "Album deleted"))
}

pub async fn put_album_cover(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<AlbumCoverPayload>,
) -> ApiResult<Response> {
    state
        .album_service()
        .update_cover_album(&id, payload.cover_url)
        .await?;

    Ok(success_message(StatusCode::OK, "Album cover updated"))
}

pub async fn post_album_like(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    user: AuthenticatedUser,
) -> ApiResult<Response> {
    let toggle = state
        .album_service()
        .add_like_in_album(&user.user_id, &id)
        .await?;

    let message = match toggle {
        LikeToggle::Liked => "Album liked",
        LikeToggle::Unliked => "Album unliked",
    };
    Ok(success_message(StatusCode::CREATED, message))
}

pub async fn get_album_likes(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let likes = state.album_service().get_likes_in_album(&id).await?;

    let mut response = success_data(StatusCode::OK, json!({ "likes": likes.likes }));
    if likes.from_cache {
        response
            .headers_mut()
            .insert(DATA_SOURCE_HEADER, HeaderValue::from_static("cache"));
    }
    Ok(response)
}
