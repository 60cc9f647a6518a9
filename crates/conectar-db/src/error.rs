//! Database-specific error types and conversions.

use conectar_core::error::MarketError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    /// A statement was rejected (schema assertion, index, transaction).
    #[error("Query failed: {0}")]
    Query(String),

    /// A stored value could not be mapped back to a domain type.
    #[error("Corrupt record: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl DbError {
    pub(crate) fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

impl From<DbError> for MarketError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => MarketError::NotFound { entity, id },
            other => MarketError::Database(other.to_string()),
        }
    }
}
