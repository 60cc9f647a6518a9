//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use surrealdb_types::SurrealValue;

#[derive(Debug, SurrealValue)]
struct VersionRow {
    version: u32,
}

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    conectar_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    for table in ["user", "opinion", "service", "service_type", "technology"] {
        assert!(info_str.contains(table), "missing {table} table");
    }
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    conectar_db::run_migrations(&db).await.unwrap();
    conectar_db::run_migrations(&db).await.unwrap();

    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version ASC")
        .await
        .unwrap();
    let rows: Vec<VersionRow> = result.take(0).unwrap();
    let versions: Vec<u32> = rows.into_iter().map(|r| r.version).collect();
    assert_eq!(versions, (1..=conectar_db::latest_version()).collect::<Vec<_>>());
}

#[tokio::test]
async fn schema_rejects_more_than_five_skills() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    conectar_db::run_migrations(&db).await.unwrap();

    let response = db
        .query(
            "CREATE user SET first_name = 'A', last_name = 'B', \
             email = 'a@b.c', password_hash = 'x', role = 'Client', plan = 'Free', \
             skills = ['1', '2', '3', '4', '5', '6']",
        )
        .await
        .unwrap();
    assert!(response.check().is_err());
}
