use schemars::JsonSchema;
use serde::Deserialize;

use super::{Payload, PayloadValidator, Validators};

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlbumPayload {
    #[schemars(length(min = 1))]
    pub name: String,
    #[schemars(range(min = 1900, max = 2100))]
    pub year: i32,
    #[schemars(url)]
    pub cover_url: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlbumCoverPayload {
    #[schemars(url)]
    pub cover_url: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SongPayload {
    #[schemars(length(min = 1))]
    pub title: String,
    #[schemars(range(min = 1900, max = 2100))]
    pub year: i32,
    #[schemars(length(min = 1))]
    pub genre: String,
    #[schemars(length(min = 1))]
    pub performer: String,
    /// Seconds
    #[schemars(range(min = 0))]
    pub duration: Option<i32>,
    pub album_id: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    #[schemars(length(min = 1))]
    pub username: String,
    #[schemars(length(min = 1))]
    pub fullname: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistPayload {
    #[schemars(length(min = 1))]
    pub name: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSongPayload {
    #[schemars(length(min = 1))]
    pub song_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationPayload {
    #[schemars(length(min = 1))]
    pub playlist_id: String,
    #[schemars(length(min = 1))]
    pub user_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExportPlaylistPayload {
    #[schemars(email)]
    pub target_email: String,
}

macro_rules! impl_payload {
    ($($payload:ty => $field:ident),* $(,)?) => {
        $(
            impl Payload for $payload {
                fn validator(validators: &Validators) -> &PayloadValidator<Self> {
                    &validators.$field
                }
            }
        )*
    };
}

impl_payload! {
    AlbumPayload => album,
    AlbumCoverPayload => album_cover,
    SongPayload => song,
    UserPayload => user,
    PlaylistPayload => playlist,
    PlaylistSongPayload => playlist_song,
    CollaborationPayload => collaboration,
    ExportPlaylistPayload => export_playlist,
}
