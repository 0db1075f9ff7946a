//! Connection setup for the board store.
//!
//! # Invariants
//! - File stores run in WAL mode; in-memory stores keep the default journal.
//! - Foreign keys are verified on after configuration, not just requested.

use super::migrations::{apply_migrations, MigrationOutcome};
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreMode {
    File(PathBuf),
    /// Private, empty store discarded with the connection.
    Memory,
}

impl Display for StoreMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(_) => write!(f, "file"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Opens (creating when missing) the board store at `path`.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_store(&StoreMode::File(path.as_ref().to_path_buf()))
}

/// Opens a fresh in-memory board store.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_store(&StoreMode::Memory)
}

/// Opens, configures and migrates a store; logs one `db_open` event.
pub fn open_store(mode: &StoreMode) -> DbResult<Connection> {
    let started_at = Instant::now();
    match connect(mode) {
        Ok((conn, outcome)) => {
            info!(
                "event=db_open module=db status=ok mode={mode} schema_version={} migrations_applied={} duration_ms={}",
                outcome.to_version,
                outcome.applied(),
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            );
            Err(err)
        }
    }
}

fn connect(mode: &StoreMode) -> DbResult<(Connection, MigrationOutcome)> {
    let mut conn = match mode {
        StoreMode::File(path) => Connection::open(path)?,
        StoreMode::Memory => Connection::open_in_memory()?,
    };
    configure(&conn, mode)?;
    let outcome = apply_migrations(&mut conn)?;
    Ok((conn, outcome))
}

fn configure(conn: &Connection, mode: &StoreMode) -> DbResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.pragma_update(None, "foreign_keys", true)?;
    let foreign_keys: bool = conn.pragma_query_value(None, "foreign_keys", |row| row.get(0))?;
    if !foreign_keys {
        return Err(DbError::ForeignKeysDisabled);
    }

    if matches!(mode, StoreMode::File(_)) {
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::StoreMode;
    use std::path::PathBuf;

    #[test]
    fn store_mode_display_hides_path() {
        assert_eq!(StoreMode::File(PathBuf::from("/srv/board.db")).to_string(), "file");
        assert_eq!(StoreMode::Memory.to_string(), "memory");
    }
}
