use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use serde::Serialize;
use serde_json::json;

use crate::http_server::{
    auth::AuthenticatedUser,
    error::ApiResult,
    http_routes::albums::SongSummaryView,
    response::{success_data, success_message},
    state::AppState,
    validator::{PlaylistPayload, PlaylistSongPayload, ValidatedJson},
};

#[derive(Serialize)]
struct PlaylistView {
    id: String,
    name: String,
    username: String,
}

#[derive(Serialize)]
struct PlaylistDetailView {
    id: String,
    name: String,
    username: String,
    songs: Vec<SongSummaryView>,
}

pub async fn post_playlist(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    ValidatedJson(payload): ValidatedJson<PlaylistPayload>,
) -> ApiResult<Response> {
    let playlist_id = state
        .playlist_service()
        .add_playlist(payload.name, &user.user_id)
        .await?;

    Ok(success_data(
        StatusCode::CREATED,
        json!({ "playlistId": playlist_id }),
    ))
}

pub async fn get_playlists(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> ApiResult<Response> {
    let playlists: Vec<PlaylistView> = state
        .playlist_service()
        .get_playlists(&user.user_id)
        .await?
        .into_iter()
        .map(|p| PlaylistView {
            id: p.id,
            name: p.name,
            username: p.username,
        })
        .collect();

    Ok(success_data(
        StatusCode::OK,
        json!({ "playlists": playlists }),
    ))
}

pub async fn delete_playlist_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    user: AuthenticatedUser,
) -> ApiResult<Response> {
    let playlists = state.playlist_service();
    playlists.verify_playlist_owner(&id, &user.user_id).await?;
    playlists.delete_playlist_by_id(&id).await?;

    Ok(success_message(StatusCode::OK, "Playlist deleted"))
}

pub async fn post_playlist_song(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    user: AuthenticatedUser,
    ValidatedJson(payload): ValidatedJson<PlaylistSongPayload>,
) -> ApiResult<Response> {
    let playlists = state.playlist_service();
    playlists.verify_playlist_access(&id, &user.user_id).await?;
    playlists
        .add_song_to_playlist(&id, &payload.song_id)
        .await?;

    Ok(success_message(
        StatusCode::CREATED,
        "Song added to playlist",
    ))
}

pub async fn get_playlist_songs(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    user: AuthenticatedUser,
) -> ApiResult<Response> {
    let playlists = state.playlist_service();
    playlists.verify_playlist_access(&id, &user.user_id).await?;
    let found = playlists.get_songs_in_playlist(&id).await?;

    let playlist = PlaylistDetailView {
        id: found.playlist.id,
        name: found.playlist.name,
        username: found.username,
        songs: found.songs.into_iter().map(SongSummaryView::from).collect(),
    };

    Ok(success_data(StatusCode::OK, json!({ "playlist": playlist })))
}

pub async fn delete_playlist_song(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    user: AuthenticatedUser,
    ValidatedJson(payload): ValidatedJson<PlaylistSongPayload>,
) -> ApiResult<Response> {
    let playlists = state.playlist_service();
    playlists.verify_playlist_access(&id, &user.user_id).await?;
    playlists
        .delete_song_from_playlist(&id, &payload.song_id)
        .await?;

    Ok(success_message(
        StatusCode::OK,
        "Song removed from playlist",
    ))
}
