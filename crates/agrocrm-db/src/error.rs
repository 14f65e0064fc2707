//! Database-specific error types and conversions.

use agrocrm_core::error::CrmError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Duplicate record: {entity}")]
    AlreadyExists { entity: String },

    #[error("Stored row could not be decoded: {0}")]
    Decode(String),
}

impl From<DbError> for CrmError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => CrmError::NotFound { entity, id },
            DbError::AlreadyExists { entity } => CrmError::AlreadyExists { entity },
            other => CrmError::Database(other.to_string()),
        }
    }
}
