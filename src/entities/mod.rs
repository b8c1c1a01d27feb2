pub mod album;
pub mod collaboration;
pub mod playlist;
pub mod playlist_song;
pub mod song;
pub mod user;
pub mod user_album_like;
