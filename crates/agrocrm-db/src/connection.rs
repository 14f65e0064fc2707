//! SurrealDB connection setup.

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

/// Where and how to reach the backing SurrealDB instance.
///
/// The server fills this from `AGROCRM_DB_*` environment variables;
/// the defaults match a local `surreal start` with root credentials.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket address without scheme, e.g. `127.0.0.1:8000`.
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "agrocrm".into(),
            database: "crm".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

/// Owns the live client handle; clones share the same connection.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    /// Dial the configured address over WebSocket, authenticate as
    /// root, and select the namespace and database. Repositories take
    /// a clone of the resulting client.
    pub async fn connect(config: &DbConfig) -> Result<Self, surrealdb::Error> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "connecting to SurrealDB"
        );

        let db = Surreal::new::<Ws>(&config.url).await?;
        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;
        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        info!("database ready");
        Ok(Self { db })
    }

    pub fn client(&self) -> &Surreal<Client> {
        &self.db
    }
}
