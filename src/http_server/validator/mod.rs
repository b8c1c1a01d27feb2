mod payloads;

use std::marker::PhantomData;
use std::sync::Arc;

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use color_eyre::eyre::{Result, WrapErr};
use jsonschema::JSONSchema;
use schemars::{JsonSchema, generate::SchemaSettings};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::http_server::{error::ApiError, state::AppState};

pub use payloads::{
    AlbumCoverPayload, AlbumPayload, CollaborationPayload, ExportPlaylistPayload, PlaylistPayload,
    PlaylistSongPayload, SongPayload, UserPayload,
};

/// A draft-07 JSON schema generated from `T` and compiled once.
pub struct PayloadValidator<T> {
    schema: JSONSchema,
    _payload: PhantomData<fn() -> T>,
}

impl<T> PayloadValidator<T>
where
    T: JsonSchema + DeserializeOwned,
{
    pub fn new() -> Result<Self> {
        let generated = SchemaSettings::draft07()
            .into_generator()
            .into_root_schema_for::<T>();
        let schema_json = serde_json::to_value(&generated)
            .wrap_err_with(|| format!("Failed to serialize schema for {}", T::schema_name()))?;

        // jsonschema 0.17 wants the schema to outlive the compiled validator; these
        // are built once at startup and live for the whole process
        let schema_static: &'static Value = Box::leak(Box::new(schema_json));

        let schema = JSONSchema::options()
            .compile(schema_static)
            .wrap_err_with(|| format!("Failed to compile schema for {}", T::schema_name()))?;

        Ok(Self {
            schema,
            _payload: PhantomData,
        })
    }

    /// Check `value` against the schema, then deserialize it.
    pub fn validate(&self, value: Value) -> Result<T, ApiError> {
        if let Err(errors) = self.schema.validate(&value) {
            let message = errors
                .map(|error| {
                    let path = error.instance_path.to_string();
                    let field = path.trim_start_matches('/');
                    if field.is_empty() {
                        error.to_string()
                    } else {
                        format!("{}: {}", field, error)
                    }
                })
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ApiError::BadRequest(message));
        }

        serde_json::from_value(value).map_err(|e| ApiError::BadRequest(e.to_string()))
    }
}

/// Validators for every request payload, compiled at startup.
pub struct Validators {
    pub album: PayloadValidator<AlbumPayload>,
    pub album_cover: PayloadValidator<AlbumCoverPayload>,
    pub song: PayloadValidator<SongPayload>,
    pub user: PayloadValidator<UserPayload>,
    pub playlist: PayloadValidator<PlaylistPayload>,
    pub playlist_song: PayloadValidator<PlaylistSongPayload>,
    pub collaboration: PayloadValidator<CollaborationPayload>,
    pub export_playlist: PayloadValidator<ExportPlaylistPayload>,
}

impl Validators {
    pub fn new() -> Result<Self> {
        Ok(Self {
            album: PayloadValidator::new()?,
            album_cover: PayloadValidator::new()?,
            song: PayloadValidator::new()?,
            user: PayloadValidator::new()?,
            playlist: PayloadValidator::new()?,
            playlist_song: PayloadValidator::new()?,
            collaboration: PayloadValidator::new()?,
            export_playlist: PayloadValidator::new()?,
        })
    }
}

/// A request body type with a validator in [`Validators`].
pub trait Payload: JsonSchema + DeserializeOwned + Send + Sized + 'static {
    fn validator(validators: &Validators) -> &PayloadValidator<Self>;
}

/// JSON body extractor that rejects payloads failing their schema with 400.
pub struct ValidatedJson<T>(pub T);

impl<T> FromRequest<Arc<AppState>> for ValidatedJson<T>
where
    T: Payload,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

        T::validator(&state.validators).validate(value).map(Self)
    }
}
