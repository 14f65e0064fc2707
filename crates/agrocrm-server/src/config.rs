//! Server configuration assembled from environment variables.

use agrocrm_auth::AuthConfig;
use agrocrm_db::DbConfig;

/// Top-level server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address for the HTTP server.
    pub listen: String,
    /// Authentication settings (JWT secret, token lifetime, pepper).
    pub auth: AuthConfig,
    /// SurrealDB connection settings.
    pub db: DbConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8080".into(),
            auth: AuthConfig::default(),
            db: DbConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Build the configuration from `AGROCRM_*` environment variables,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("AGROCRM_LISTEN") {
            config.listen = v;
        }
        if let Ok(v) = std::env::var("AGROCRM_SECRET_KEY") {
            config.auth.secret_key = v;
        }
        if let Ok(v) = std::env::var("AGROCRM_PEPPER") {
            config.auth.pepper = Some(v);
        }
        if let Ok(v) = std::env::var("AGROCRM_DB_URL") {
            config.db.url = v;
        }
        if let Ok(v) = std::env::var("AGROCRM_DB_NS") {
            config.db.namespace = v;
        }
        if let Ok(v) = std::env::var("AGROCRM_DB_NAME") {
            config.db.database = v;
        }
        if let Ok(v) = std::env::var("AGROCRM_DB_USER") {
            config.db.username = v;
        }
        if let Ok(v) = std::env::var("AGROCRM_DB_PASS") {
            config.db.password = v;
        }

        config
    }
}
