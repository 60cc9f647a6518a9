//! SurrealDB repository implementations.

mod opinion;
mod service;
mod service_type;
mod technology;
mod user;

pub use opinion::SurrealOpinionRepository;
pub use service::SurrealServiceRepository;
pub use service_type::SurrealServiceTypeRepository;
pub use technology::SurrealTechnologyRepository;
pub use user::SurrealUserRepository;

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
pub(crate) struct CountRow {
    pub total: u64,
}

pub(crate) fn parse_uuid(raw: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::Decode(format!("invalid UUID '{raw}': {e}")))
}

pub(crate) fn parse_uuids(raw: &[String]) -> Result<Vec<Uuid>, DbError> {
    raw.iter().map(|s| parse_uuid(s)).collect()
}

/// Whether a failed write was rejected by the unique index `index`.
pub(crate) fn violates_index(message: &str, index: &str) -> bool {
    message.contains(index) && message.contains("already contains")
}

pub(crate) fn id_strings(ids: &[Uuid]) -> Vec<String> {
    ids.iter().map(Uuid::to_string).collect()
}

/// Whether a record with the given id exists in `table`.
pub(crate) async fn record_exists<C: Connection>(
    db: &Surreal<C>,
    table: &str,
    id: Uuid,
) -> Result<bool, DbError> {
    let mut result = db
        .query("SELECT count() AS total FROM type::record($table, $id) GROUP ALL")
        .bind(("table", table.to_string()))
        .bind(("id", id.to_string()))
        .await?;
    let rows: Vec<CountRow> = result.take(0)?;
    Ok(rows.first().map(|r| r.total).unwrap_or(0) > 0)
}
