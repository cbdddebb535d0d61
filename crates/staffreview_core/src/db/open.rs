//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas required by review persistence.
//! - Trigger schema migrations before returning a usable connection.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`, so `ON DELETE CASCADE`
//!   from `employees` to `reviews` is enforced.
//! - Returned connections have migrations fully applied.

use super::migrations::apply_migrations;
use super::DbResult;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a SQLite database file and applies all pending migrations.
///
/// # Side effects
/// - Creates the file when it does not exist.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    open_with("file", || Connection::open(path))
}

/// Opens an in-memory SQLite database and applies all pending migrations.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with("memory", Connection::open_in_memory)
}

fn open_with(
    mode: &str,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let mut conn = match open() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::open_db_in_memory;

    #[test]
    fn in_memory_connection_enforces_foreign_keys() {
        let conn = open_db_in_memory().unwrap();
        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }
}
