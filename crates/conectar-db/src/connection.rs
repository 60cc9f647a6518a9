//! Marketplace store connection. One `Surreal<Any>` handle is opened at
//! startup and cloned into every repository.

use surrealdb::Surreal;
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use tracing::info;

/// Where the marketplace data lives. The server fills it from the
/// `SURREAL_*` environment variables.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Engine URL. `ws://`/`http://` for a server, `mem://` for the
    /// in-process store the test suites use.
    pub url: String,
    /// Defaults to `conectar`.
    pub namespace: String,
    /// Defaults to `main`.
    pub database: String,
    /// Server root credentials; ignored for `mem://`.
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:8000".into(),
            namespace: "conectar".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

impl DbConfig {
    /// Embedded engines have no users to sign in as.
    fn is_embedded(&self) -> bool {
        self.url.starts_with("mem://")
    }
}

/// Owns the marketplace store handle. Cheap to clone.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Any>,
}

impl DbManager {
    /// Open the engine named by `config.url`, sign in unless it is
    /// `mem://`, and select the marketplace namespace/database. Migrations
    /// are not applied here; call [`crate::run_migrations`] next.
    pub async fn connect(config: &DbConfig) -> Result<Self, surrealdb::Error> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "opening marketplace store"
        );

        let db = any::connect(&config.url).await?;

        if !config.is_embedded() {
            db.signin(Root {
                username: config.username.clone(),
                password: config.password.clone(),
            })
            .await?;
        }

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        info!("marketplace store ready");

        Ok(Self { db })
    }

    /// Handle shared by the repositories and the API state.
    pub fn client(&self) -> &Surreal<Any> {
        &self.db
    }
}
