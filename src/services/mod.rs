pub mod album;
pub mod cache;
pub mod collaboration;
pub mod export;
pub mod playlist;
pub mod producer;
pub mod redis_cache;
pub mod song;
pub mod user;

/// Generate a primary key of the form `<prefix>-<16 random chars>`.
pub fn generate_id(prefix: &str) -> String {
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", prefix, &random[..16])
}
