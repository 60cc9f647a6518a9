//! SurrealDB implementation of [`TechnologyRepository`].

use chrono::{DateTime, Utc};
use conectar_core::error::{MarketError, MarketResult};
use conectar_core::models::technology::Technology;
use conectar_core::repository::TechnologyRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;
use uuid::Uuid;

use super::{CountRow, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct TechnologyRow {
    record_id: String,
    name: String,
    created_at: DateTime<Utc>,
}

/// Canonical form of a technology name.
fn normalize(name: &str) -> String {
    name.trim().to_uppercase()
}

/// SurrealDB implementation of the Technology repository.
#[derive(Clone)]
pub struct SurrealTechnologyRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTechnologyRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TechnologyRepository for SurrealTechnologyRepository<C> {
    async fn create(&self, name: &str) -> MarketResult<Technology> {
        let name = normalize(name);
        if name.is_empty() {
            return Err(MarketError::validation("El nombre es obligatorio"));
        }

        let mut count = self
            .db
            .query("SELECT count() AS total FROM technology WHERE name = $name GROUP ALL")
            .bind(("name", name.clone()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<CountRow> = count.take(0).map_err(DbError::from)?;
        if rows.first().map(|r| r.total).unwrap_or(0) > 0 {
            return Err(MarketError::already_exists(
                "technology",
                "Esa tecnología ya existe.",
            ));
        }

        let id = Uuid::new_v4();
        let result = self
            .db
            .query(
                "CREATE type::record('technology', $id) SET name = $name; \
                 SELECT meta::id(id) AS record_id, * FROM type::record('technology', $id);",
            )
            .bind(("id", id.to_string()))
            .bind(("name", name))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TechnologyRow> = result.take(1).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("technology", id))?;

        info!(technology = %row.name, "Technology created");
        Ok(Technology {
            id: parse_uuid(&row.record_id)?,
            name: row.name,
            created_at: row.created_at,
        })
    }

    async fn list_names(&self) -> MarketResult<Vec<String>> {
        let mut result = self
            .db
            .query("SELECT VALUE name FROM technology")
            .await
            .map_err(DbError::from)?;

        let mut names: Vec<String> = result.take(0).map_err(DbError::from)?;
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::normalize;

    #[test]
    fn names_are_trimmed_and_uppercased() {
        assert_eq!(normalize("  rust "), "RUST");
        assert_eq!(normalize("Node.js"), "NODE.JS");
    }
}
