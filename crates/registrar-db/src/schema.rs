//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! Record keys are UUID strings. Timestamps are stored as Unix seconds.

use serde::Deserialize;
use surrealdb::{Connection, Surreal};
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE int \
    DEFAULT time::unix(time::now());
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, Deserialize)]
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
        name: "users",
        sql: SCHEMA_V1,
    },
    Migration {
        version: 2,
        name: "students",
        sql: SCHEMA_V2,
    },
];

// -----------------------------------------------------------------------
// v1: credential records
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD username ON TABLE user TYPE string \
    ASSERT string::len($value) > 0;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD role ON TABLE user TYPE string \
    ASSERT $value IN ['user', 'teacher', 'admin'];
DEFINE FIELD created_at ON TABLE user TYPE int DEFAULT time::unix(time::now());
DEFINE INDEX idx_user_username ON TABLE user COLUMNS username UNIQUE;
";

// -----------------------------------------------------------------------
// v2: student records
// -----------------------------------------------------------------------

const SCHEMA_V2: &str = "\
DEFINE TABLE student SCHEMAFULL;
DEFINE FIELD name ON TABLE student TYPE string;
DEFINE FIELD age ON TABLE student TYPE int ASSERT $value >= 0;
DEFINE FIELD grade ON TABLE student TYPE string;
DEFINE FIELD email ON TABLE student TYPE string;
DEFINE FIELD created_by ON TABLE student TYPE string;
DEFINE FIELD created_at ON TABLE student TYPE int DEFAULT time::unix(time::now());
DEFINE INDEX idx_student_created_by ON TABLE student COLUMNS created_by;
";

/// Run all pending schema migrations.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
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

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

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

        info!(version = migration.version, "Migration applied successfully");
    }

    Ok(())
}

/// Latest schema version known to this build.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
}
