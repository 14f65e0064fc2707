//! Schema definitions and migration runner for SurrealDB.
//!
//! All tables are SCHEMAFULL. UUIDs are stored as strings; enum-like
//! fields are strings constrained with ASSERT. The customer's billing
//! date is an ISO-8601 date string (calendar date, no time component).

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

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
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Staff users
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD name ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD role ON TABLE user TYPE string \
    ASSERT $value IN ['gerente', 'vendedor'];
DEFINE FIELD active ON TABLE user TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD created_by ON TABLE user TYPE option<string>;
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;

-- =======================================================================
-- Customers
-- =======================================================================
DEFINE TABLE customer SCHEMAFULL;
DEFINE FIELD name ON TABLE customer TYPE string;
DEFINE FIELD phone ON TABLE customer TYPE string;
DEFINE FIELD city ON TABLE customer TYPE string;
DEFINE FIELD farm ON TABLE customer TYPE option<string>;
DEFINE FIELD coordinates ON TABLE customer TYPE option<string>;
DEFINE FIELD area ON TABLE customer TYPE float;
DEFINE FIELD machinery ON TABLE customer TYPE string;
DEFINE FIELD temperature ON TABLE customer TYPE string \
    ASSERT $value IN ['Fria', 'Morna', 'Quente'] DEFAULT 'Fria';
DEFINE FIELD deal_value ON TABLE customer TYPE option<float>;
DEFINE FIELD opportunities ON TABLE customer TYPE option<string>;
DEFINE FIELD pending_items ON TABLE customer TYPE option<string>;
DEFINE FIELD status ON TABLE customer TYPE string \
    DEFAULT 'Início de Relacionamento';
DEFINE FIELD billing_date ON TABLE customer TYPE option<string>;
DEFINE FIELD billing_notes ON TABLE customer TYPE option<string>;
DEFINE FIELD created_at ON TABLE customer TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE customer TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD created_by ON TABLE customer TYPE string;
DEFINE INDEX idx_customer_created ON TABLE customer COLUMNS created_at;

-- =======================================================================
-- Customer history (append-only child of customer)
-- =======================================================================
DEFINE TABLE customer_history SCHEMAFULL;
DEFINE FIELD customer_id ON TABLE customer_history TYPE string;
DEFINE FIELD event ON TABLE customer_history TYPE string;
DEFINE FIELD description ON TABLE customer_history TYPE option<string>;
DEFINE FIELD occurred_at ON TABLE customer_history TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD user_id ON TABLE customer_history TYPE string;
DEFINE INDEX idx_history_customer ON TABLE customer_history \
    COLUMNS customer_id, occurred_at;

-- =======================================================================
-- Customer photos (metadata only; binary content lives elsewhere)
-- =======================================================================
DEFINE TABLE customer_photo SCHEMAFULL;
DEFINE FIELD customer_id ON TABLE customer_photo TYPE string;
DEFINE FIELD filename ON TABLE customer_photo TYPE string;
DEFINE FIELD path ON TABLE customer_photo TYPE string;
DEFINE FIELD description ON TABLE customer_photo TYPE option<string>;
DEFINE FIELD uploaded_at ON TABLE customer_photo TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD user_id ON TABLE customer_photo TYPE string;
DEFINE INDEX idx_photo_customer ON TABLE customer_photo \
    COLUMNS customer_id, uploaded_at;
";

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates the `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum. The
/// DEFINE statements are idempotent, so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }
        info!(
            version = migration.version,
            name = migration.name,
            "applying migration"
        );
        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "migration v{} '{}' failed: {}",
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
                    "failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;
    }

    Ok(())
}
