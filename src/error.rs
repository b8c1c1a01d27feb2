use sea_orm::{DbErr, SqlErr};

/// Errors surfaced by the catalog services.
///
/// The first three variants are client errors and carry a message that is
/// safe to return to the caller. `Internal` wraps everything else.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{0}")]
    NotFound(String),
    /// Bad input, or a constraint violated on insert.
    #[error("{0}")]
    Invariant(String),
    #[error("{0}")]
    Authorization(String),
    #[error(transparent)]
    Internal(#[from] color_eyre::Report),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl CatalogError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant(message.into())
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization(message.into())
    }

    /// Classifies an error raised by an insert or update.
    ///
    /// Unique and foreign key violations are the caller's fault and become
    /// `Invariant` with `message`; anything else is internal.
    pub fn from_write(err: DbErr, message: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail))
            | Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                tracing::debug!(%detail, "Rejected write: {}", message);
                Self::Invariant(message.to_string())
            }
            _ => Self::Internal(color_eyre::Report::new(err).wrap_err(message.to_string())),
        }
    }
}
