//! Store schema versioning.
//!
//! `_migrations` records the highest applied version; anything above it in
//! [`MIGRATIONS`] runs on open, in order.

use super::Error;
use tokio_rusqlite::{Connection, params};

/// Schema batches keyed by ascending version.
const MIGRATIONS: &[(i64, &str)] = &[(1, include_str!("../../migrations/001_cache_stores.sql"))];

/// Bring the schema up to the newest version.
///
/// # Errors
///
/// `Error::MigrationFailed` names the batch that failed to apply.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(Error::from)?;

        let current: i64 = conn
            .query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |row| {
                row.get(0)
            })
            .map_err(Error::from)?;

        for &(version, sql) in MIGRATIONS.iter().filter(|(version, _)| *version > current) {
            conn.execute_batch(sql)
                .map_err(|e| Error::MigrationFailed(format!("version {version}: {e}")))?;
            conn.execute(
                "INSERT INTO _migrations (version, applied_at) VALUES (?1, ?2)",
                params![version, chrono::Utc::now().to_rfc3339()],
            )
            .map_err(Error::from)?;
        }

        Ok(())
    })
    .await
    .map_err(Error::from)
}
