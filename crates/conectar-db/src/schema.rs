//! Schema definitions and migration runner for SurrealDB.
//!
//! All tables are SCHEMAFULL. UUIDs and cross-table references are stored
//! as strings; enums are stored as their variant names with ASSERT
//! constraints.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "marketplace_schema",
        sql: SCHEMA_V1,
    },
    Migration {
        version: 2,
        name: "lookup_indexes",
        sql: SCHEMA_V2,
    },
];

// -----------------------------------------------------------------------
// Schema v1: marketplace tables
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users (clients and freelancers)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD first_name ON TABLE user TYPE string;
DEFINE FIELD last_name ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD role ON TABLE user TYPE string \
    ASSERT $value IN ['Client', 'Freelancer'];
DEFINE FIELD plan ON TABLE user TYPE string \
    ASSERT $value IN ['Free', 'Premium'];
DEFINE FIELD linkedin ON TABLE user TYPE option<string>;
DEFINE FIELD portfolio ON TABLE user TYPE option<string>;
DEFINE FIELD description ON TABLE user TYPE option<string>;
DEFINE FIELD rate ON TABLE user TYPE option<number>;
DEFINE FIELD is_available ON TABLE user TYPE bool DEFAULT true;
DEFINE FIELD skills ON TABLE user TYPE array<string> DEFAULT [] \
    ASSERT array::len($value) <= 5;
DEFINE FIELD visit_count ON TABLE user TYPE int DEFAULT 0;
DEFINE FIELD linkedin_access_count ON TABLE user TYPE int DEFAULT 0;
DEFINE FIELD portfolio_access_count ON TABLE user TYPE int DEFAULT 0;
DEFINE FIELD visit_history ON TABLE user TYPE array<object> DEFAULT [];
DEFINE FIELD visit_history[*].ip ON TABLE user TYPE string;
DEFINE FIELD visit_history[*].last_visit ON TABLE user TYPE datetime;
DEFINE FIELD opinion_ids ON TABLE user TYPE array<string> DEFAULT [];
DEFINE FIELD service_ids ON TABLE user TYPE array<string> DEFAULT [];
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;

-- =======================================================================
-- Opinions (one user rating another)
-- =======================================================================
DEFINE TABLE opinion SCHEMAFULL;
DEFINE FIELD recipient_id ON TABLE opinion TYPE string;
DEFINE FIELD author_id ON TABLE opinion TYPE string;
DEFINE FIELD score ON TABLE opinion TYPE int \
    ASSERT $value >= 1 AND $value <= 5;
DEFINE FIELD body ON TABLE opinion TYPE string;
DEFINE FIELD created_at ON TABLE opinion TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Service catalog
-- =======================================================================
DEFINE TABLE service_type SCHEMAFULL;
DEFINE FIELD name ON TABLE service_type TYPE string;
DEFINE FIELD category ON TABLE service_type TYPE string;
DEFINE FIELD main_category ON TABLE service_type TYPE string;
DEFINE FIELD base_description ON TABLE service_type TYPE option<string>;
DEFINE INDEX idx_service_type_name ON TABLE service_type \
    COLUMNS name UNIQUE;

DEFINE TABLE service SCHEMAFULL;
DEFINE FIELD freelancer_id ON TABLE service TYPE string;
DEFINE FIELD service_type_id ON TABLE service TYPE string;
DEFINE FIELD price ON TABLE service TYPE number ASSERT $value >= 0;
DEFINE FIELD description ON TABLE service TYPE string \
    ASSERT string::len($value) <= 500;
DEFINE FIELD estimated_duration ON TABLE service TYPE option<string>;
DEFINE FIELD created_at ON TABLE service TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE service TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_service_freelancer_type ON TABLE service \
    COLUMNS freelancer_id, service_type_id UNIQUE;

-- =======================================================================
-- Technologies (skill vocabulary)
-- =======================================================================
DEFINE TABLE technology SCHEMAFULL;
DEFINE FIELD name ON TABLE technology TYPE string;
DEFINE FIELD created_at ON TABLE technology TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_technology_name ON TABLE technology \
    COLUMNS name UNIQUE;
";

// -----------------------------------------------------------------------
// Schema v2: secondary indexes for per-user lookups
// -----------------------------------------------------------------------

const SCHEMA_V2: &str = "\
DEFINE INDEX IF NOT EXISTS idx_opinion_recipient ON TABLE opinion \
    COLUMNS recipient_id;
DEFINE INDEX IF NOT EXISTS idx_opinion_author ON TABLE opinion \
    COLUMNS author_id;
DEFINE INDEX IF NOT EXISTS idx_service_freelancer ON TABLE service \
    COLUMNS freelancer_id;
DEFINE INDEX IF NOT EXISTS idx_service_type_main_category ON TABLE service_type \
    COLUMNS main_category;
";

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies each
/// migration whose version exceeds the highest recorded one.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS
        .iter()
        .filter(|m| m.version > current_version)
    {
        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "Migration v{} '{}' failed: {}",
                migration.version, migration.name, e,
            ))
        })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;
    }

    info!(version = latest_version(), "Schema up to date");
    Ok(())
}

/// Highest schema version this build knows about.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
}
