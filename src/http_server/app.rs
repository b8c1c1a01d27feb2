use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    routing::{get, post, put},
};
use color_eyre::eyre::{Context, eyre};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::{CacheConfig, Config},
    database::Database,
    http_server::{http_routes, state::AppState, validator::Validators},
    ports::cache::CacheStore,
    services::{cache::InMemoryCache, producer::AmqpProducer, redis_cache::RedisCache},
};

pub struct HttpServerConfig {
    pub port: u16,
    pub database: Arc<Database>,
    pub config: Config,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/users", post(http_routes::users::post_user))
        .route(
            "/albums",
            post(http_routes::albums::post_album).get(http_routes::albums::get_albums),
        )
        .route(
            "/albums/{id}",
            get(http_routes::albums::get_album_by_id)
                .put(http_routes::albums::put_album_by_id)
                .delete(http_routes::albums::delete_album_by_id),
        )
        .route(
            "/albums/{id}/cover",
            put(http_routes::albums::put_album_cover),
        )
        .route(
            "/albums/{id}/likes",
            post(http_routes::albums::post_album_like).get(http_routes::albums::get_album_likes),
        )
        .route(
            "/songs",
            post(http_routes::songs::post_song).get(http_routes::songs::get_songs),
        )
        .route(
            "/songs/{id}",
            get(http_routes::songs::get_song_by_id)
                .put(http_routes::songs::put_song_by_id)
                .delete(http_routes::songs::delete_song_by_id),
        )
        .route(
            "/playlists",
            post(http_routes::playlists::post_playlist).get(http_routes::playlists::get_playlists),
        )
        .route(
            "/playlists/{id}",
            axum::routing::delete(http_routes::playlists::delete_playlist_by_id),
        )
        .route(
            "/playlists/{id}/songs",
            post(http_routes::playlists::post_playlist_song)
                .get(http_routes::playlists::get_playlist_songs)
                .delete(http_routes::playlists::delete_playlist_song),
        )
        .route(
            "/collaborations",
            post(http_routes::collaborations::post_collaboration)
                .delete(http_routes::collaborations::delete_collaboration),
        )
        .route(
            "/export/playlists/{id}",
            post(http_routes::exports::post_export_playlist),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start(
    HttpServerConfig {
        port,
        database,
        config,
    }: HttpServerConfig,
) -> color_eyre::Result<()> {
    let cache = cache_backend(&config.cache).await?;
    let producer = Arc::new(AmqpProducer::new(
        config.queue.amqp_url.clone(),
        config.queue.close_delay,
    ));

    let app_state = Arc::new(AppState {
        db: database,
        cache,
        producer,
        export_queue: config.queue.export_queue.clone(),
        validators: Validators::new().wrap_err("Failed to build request validators")?,
    });

    let app = router(app_state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .wrap_err_with(|| eyre!("Failed to bind to port {}", port))?;
    tracing::info!(port, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("Failed to start HTTP server")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Redis when `redis_url` is configured, otherwise a process-local cache
/// with a background purge task.
async fn cache_backend(config: &CacheConfig) -> color_eyre::Result<Arc<dyn CacheStore>> {
    if let Some(redis_url) = &config.redis_url {
        tracing::info!("Using Redis cache");
        let cache: Arc<dyn CacheStore> =
            Arc::new(RedisCache::connect(redis_url, config.ttl).await?);
        return Ok(cache);
    }

    tracing::info!("Using in-process cache");
    let cache = Arc::new(InMemoryCache::new(config.ttl));

    // Expired entries are never served, this only bounds memory
    let purge_every = config.ttl.max(Duration::from_secs(1));
    let purged_cache = cache.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(purge_every);
        loop {
            interval.tick().await;
            let purged = purged_cache.purge_expired().await;
            if purged > 0 {
                tracing::debug!(purged, "Purged expired cache entries");
            }
        }
    });

    let cache: Arc<dyn CacheStore> = cache;
    Ok(cache)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::queue::{MessageProducer, MockMessageProducer};
    use crate::test_utils::{insert_user, test_db};
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn test_router_with(producer: MockMessageProducer) -> (Router, Arc<Database>) {
        let db = test_db().await;
        let producer: Arc<dyn MessageProducer> = Arc::new(producer);
        let state = Arc::new(AppState {
            db: db.clone(),
            cache: Arc::new(InMemoryCache::new(Duration::from_secs(60))),
            producer,
            export_queue: "export:playlist".to_string(),
            validators: Validators::new().unwrap(),
        });
        (router(state), db)
    }

    async fn test_router() -> (Router, Arc<Database>) {
        test_router_with(MockMessageProducer::new()).await
    }

    async fn send(
        router: &Router,
        method: Method,
        uri: &str,
        user_id: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Option<String>, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user_id) = user_id {
            builder = builder.header("X-User-Id", user_id);
        }
        let req = match body {
            Some(payload) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let data_source = response
            .headers()
            .get("X-Data-Source")
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, data_source, body)
    }

    #[tokio::test]
    async fn test_album_crud_round_trip() {
        let (router, _db) = test_router().await;

        let (status, _, created) = send(
            &router,
            Method::POST,
            "/albums",
            None,
            Some(json!({ "name": "Parachutes", "year": 2000, "coverUrl": "http://cdn.example/p.jpg" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["status"], "success");
        let album_id = created["data"]["albumId"].as_str().unwrap().to_string();

        let (status, _, fetched) =
            send(&router, Method::GET, &format!("/albums/{album_id}"), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["data"]["album"]["name"], "Parachutes");
        assert_eq!(fetched["data"]["album"]["coverUrl"], "http://cdn.example/p.jpg");
        assert_eq!(fetched["data"]["album"]["songs"], json!([]));

        let (status, _, _) = send(
            &router,
            Method::DELETE,
            &format!("/albums/{album_id}"),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _, missing) =
            send(&router, Method::GET, &format!("/albums/{album_id}"), None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(missing["status"], "fail");
    }

    #[tokio::test]
    async fn test_invalid_payload_is_rejected() {
        let (router, _db) = test_router().await;

        let (status, _, body) = send(
            &router,
            Method::POST,
            "/albums",
            None,
            Some(json!({ "name": "", "year": 2000 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "fail");

        let (status, _, body) = send(
            &router,
            Method::POST,
            "/songs",
            None,
            Some(json!({ "title": "No year", "genre": "Pop", "performer": "Me" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "fail");
    }

    #[tokio::test]
    async fn test_song_filters_over_http() {
        let (router, _db) = test_router().await;

        for (title, performer) in [("Yellow", "Coldplay"), ("Creep", "Radiohead")] {
            let (status, _, _) = send(
                &router,
                Method::POST,
                "/songs",
                None,
                Some(json!({ "title": title, "year": 2000, "genre": "Rock", "performer": performer })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, _, body) =
            send(&router, Method::GET, "/songs?performer=Radio", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let songs = body["data"]["songs"].as_array().unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0]["title"], "Creep");
    }

    #[tokio::test]
    async fn test_likes_report_cache_source() {
        let (router, db) = test_router().await;
        let user_id = insert_user(&db, "fan").await;

        let (_, _, created) = send(
            &router,
            Method::POST,
            "/albums",
            None,
            Some(json!({ "name": "X&Y", "year": 2005 })),
        )
        .await;
        let album_id = created["data"]["albumId"].as_str().unwrap().to_string();
        let likes_uri = format!("/albums/{album_id}/likes");

        let (status, _, _) = send(&router, Method::POST, &likes_uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _, _) = send(&router, Method::POST, &likes_uri, Some(&user_id), None).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, source, body) = send(&router, Method::GET, &likes_uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(source, None);
        assert_eq!(body["data"]["likes"], 1);

        let (_, source, body) = send(&router, Method::GET, &likes_uri, None, None).await;
        assert_eq!(source.as_deref(), Some("cache"));
        assert_eq!(body["data"]["likes"], 1);

        send(&router, Method::POST, &likes_uri, Some(&user_id), None).await;

        let (_, source, body) = send(&router, Method::GET, &likes_uri, None, None).await;
        assert_eq!(source, None);
        assert_eq!(body["data"]["likes"], 0);
    }

    #[tokio::test]
    async fn test_collaborator_access() {
        let (router, db) = test_router().await;
        let owner = insert_user(&db, "owner").await;
        let guest = insert_user(&db, "guest").await;

        let (_, _, created) = send(
            &router,
            Method::POST,
            "/playlists",
            Some(&owner),
            Some(json!({ "name": "Shared" })),
        )
        .await;
        let playlist_id = created["data"]["playlistId"].as_str().unwrap().to_string();

        let (_, _, song) = send(
            &router,
            Method::POST,
            "/songs",
            None,
            Some(json!({ "title": "Clocks", "year": 2002, "genre": "Rock", "performer": "Coldplay" })),
        )
        .await;
        let song_id = song["data"]["songId"].as_str().unwrap().to_string();
        let songs_uri = format!("/playlists/{playlist_id}/songs");

        let (status, _, _) = send(
            &router,
            Method::POST,
            &songs_uri,
            Some(&guest),
            Some(json!({ "songId": song_id })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _, _) = send(
            &router,
            Method::POST,
            "/collaborations",
            Some(&owner),
            Some(json!({ "playlistId": playlist_id, "userId": guest })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _, _) = send(
            &router,
            Method::POST,
            &songs_uri,
            Some(&guest),
            Some(json!({ "songId": song_id })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _, body) = send(&router, Method::GET, &songs_uri, Some(&guest), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["playlist"]["username"], "owner");
        assert_eq!(body["data"]["playlist"]["songs"][0]["title"], "Clocks");

        let (status, _, _) = send(
            &router,
            Method::DELETE,
            &format!("/playlists/{playlist_id}"),
            Some(&guest),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _, _) = send(
            &router,
            Method::POST,
            &format!("/export/playlists/{playlist_id}"),
            Some(&guest),
            Some(json!({ "targetEmail": "guest@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_owner_export_is_queued() {
        let mut producer = MockMessageProducer::new();
        producer
            .expect_send_message()
            .times(1)
            .returning(|_, _| Ok(()));
        let (router, db) = test_router_with(producer).await;
        let owner = insert_user(&db, "owner").await;

        let (_, _, created) = send(
            &router,
            Method::POST,
            "/playlists",
            Some(&owner),
            Some(json!({ "name": "Export" })),
        )
        .await;
        let playlist_id = created["data"]["playlistId"].as_str().unwrap().to_string();

        let (status, _, body) = send(
            &router,
            Method::POST,
            &format!("/export/playlists/{playlist_id}"),
            Some(&owner),
            Some(json!({ "targetEmail": "owner@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "success");
    }

    #[tokio::test]
    async fn test_empty_playlists_list() {
        let (router, db) = test_router().await;
        let user = insert_user(&db, "nobody").await;

        let (status, _, body) = send(&router, Method::GET, "/playlists", Some(&user), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["playlists"], json!([]));
    }

    #[tokio::test]
    async fn test_cache_backend_defaults_to_in_process() {
        let cache = cache_backend(&CacheConfig::default()).await.unwrap();

        cache.set("album-likes:a", "2".into()).await.unwrap();
        assert_eq!(
            cache.get("album-likes:a").await.unwrap().as_deref(),
            Some("2")
        );
    }

    #[tokio::test]
    async fn test_cache_backend_reports_bad_redis_url() {
        let config = CacheConfig {
            redis_url: Some("not a redis url".to_string()),
            ..CacheConfig::default()
        };

        assert!(cache_backend(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_user_is_unauthorized() {
        let (router, _db) = test_router().await;

        let (status, _, body) = send(
            &router,
            Method::POST,
            "/playlists",
            Some("user-nobody"),
            Some(json!({ "name": "Ghost" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["status"], "fail");
        assert_eq!(body["message"], "Unknown user");
    }

    #[tokio::test]
    async fn test_only_owner_manages_collaborations() {
        let (router, db) = test_router().await;
        let owner = insert_user(&db, "owner").await;
        let guest = insert_user(&db, "guest").await;
        let intruder = insert_user(&db, "intruder").await;

        let (_, _, created) = send(
            &router,
            Method::POST,
            "/playlists",
            Some(&owner),
            Some(json!({ "name": "Private" })),
        )
        .await;
        let playlist_id = created["data"]["playlistId"].as_str().unwrap().to_string();
        let collaboration = json!({ "playlistId": playlist_id, "userId": guest });

        let (status, _, _) = send(
            &router,
            Method::POST,
            "/collaborations",
            Some(&intruder),
            Some(collaboration.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _, _) = send(
            &router,
            Method::POST,
            "/collaborations",
            Some(&owner),
            Some(collaboration.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _, _) = send(
            &router,
            Method::DELETE,
            "/collaborations",
            Some(&intruder),
            Some(collaboration.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _, _) = send(
            &router,
            Method::DELETE,
            "/collaborations",
            Some(&owner),
            Some(collaboration),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}
