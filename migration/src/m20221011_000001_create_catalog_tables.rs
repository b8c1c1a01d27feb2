use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(User::Id)
                            .string_len(50)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(User::Username)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(User::Fullname).text().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Album::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Album::Id)
                            .string_len(50)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Album::Name).text().not_null())
                    .col(ColumnDef::new(Album::Year).integer().not_null())
                    .to_owned(),
            )
            .await?;

        // Songs outlive their album: deleting an album only detaches them
        manager
            .create_table(
                Table::create()
                    .table(Song::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Song::Id)
                            .string_len(50)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Song::Title).text().not_null())
                    .col(ColumnDef::new(Song::Year).integer().not_null())
                    .col(ColumnDef::new(Song::Performer).text().not_null())
                    .col(ColumnDef::new(Song::Genre).text().not_null())
                    .col(ColumnDef::new(Song::Duration).integer())
                    .col(ColumnDef::new(Song::AlbumId).string_len(50))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_songs_album_id")
                            .from(Song::Table, Song::AlbumId)
                            .to(Album::Table, Album::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Playlist::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Playlist::Id)
                            .string_len(50)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Playlist::Name).text().not_null())
                    .col(ColumnDef::new(Playlist::Owner).string_len(50).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_playlists_owner")
                            .from(Playlist::Table, Playlist::Owner)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PlaylistSong::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlaylistSong::Id)
                            .string_len(50)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PlaylistSong::PlaylistId)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(ColumnDef::new(PlaylistSong::SongId).string_len(50).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_playlist_songs_playlist_id")
                            .from(PlaylistSong::Table, PlaylistSong::PlaylistId)
                            .to(Playlist::Table, Playlist::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_playlist_songs_song_id")
                            .from(PlaylistSong::Table, PlaylistSong::SongId)
                            .to(Song::Table, Song::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Collaboration::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Collaboration::Id)
                            .string_len(50)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Collaboration::PlaylistId)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Collaboration::UserId)
                            .string_len(50)
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_collaborations_playlist_id")
                            .from(Collaboration::Table, Collaboration::PlaylistId)
                            .to(Playlist::Table, Playlist::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_collaborations_user_id")
                            .from(Collaboration::Table, Collaboration::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .unique()
                    .name("idx_collaborations_playlist_user")
                    .table(Collaboration::Table)
                    .col(Collaboration::PlaylistId)
                    .col(Collaboration::UserId)
                    .to_owned(),
            )
            .await?;

        // No unique (user_id, album_id) index: the like toggle keeps pairs unique
        manager
            .create_table(
                Table::create()
                    .table(UserAlbumLike::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserAlbumLike::Id)
                            .string_len(50)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserAlbumLike::UserId)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserAlbumLike::AlbumId)
                            .string_len(50)
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_album_likes_user_id")
                            .from(UserAlbumLike::Table, UserAlbumLike::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_album_likes_album_id")
                            .from(UserAlbumLike::Table, UserAlbumLike::AlbumId)
                            .to(Album::Table, Album::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_album_likes_album_id")
                    .table(UserAlbumLike::Table)
                    .col(UserAlbumLike::AlbumId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order
        manager
            .drop_table(Table::drop().table(UserAlbumLike::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Collaboration::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PlaylistSong::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Playlist::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Song::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Album::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum User {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Username,
    Fullname,
}

#[derive(DeriveIden)]
enum Album {
    #[sea_orm(iden = "albums")]
    Table,
    Id,
    Name,
    Year,
}

#[derive(DeriveIden)]
enum Song {
    #[sea_orm(iden = "songs")]
    Table,
    Id,
    Title,
    Year,
    Performer,
    Genre,
    Duration,
    AlbumId,
}

#[derive(DeriveIden)]
enum Playlist {
    #[sea_orm(iden = "playlists")]
    Table,
    Id,
    Name,
    Owner,
}

#[derive(DeriveIden)]
enum PlaylistSong {
    #[sea_orm(iden = "playlist_songs")]
    Table,
    Id,
    PlaylistId,
    SongId,
}

#[derive(DeriveIden)]
enum Collaboration {
    #[sea_orm(iden = "collaborations")]
    Table,
    Id,
    PlaylistId,
    UserId,
}

#[derive(DeriveIden)]
enum UserAlbumLike {
    #[sea_orm(iden = "user_album_likes")]
    Table,
    Id,
    UserId,
    AlbumId,
}
