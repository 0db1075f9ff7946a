//! Ordered schema steps for the board store.
//!
//! # Invariants
//! - Step N (1-based) brings the schema to `user_version = N`.
//! - Steps are append-only; shipped SQL is never edited.
//! - Pending steps run in one transaction together with the version bump.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

/// `(name, sql)` per schema version, oldest first.
const STEPS: &[(&str, &str)] = &[("init", include_str!("0001_init.sql"))];

/// Versions before and after one `apply_migrations` run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationOutcome {
    pub from_version: u32,
    pub to_version: u32,
}

impl MigrationOutcome {
    pub fn applied(&self) -> u32 {
        self.to_version - self.from_version
    }
}

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    STEPS.len() as u32
}

/// Brings `conn` up to `latest_version()`.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the store is ahead of this build.
/// - `Sqlite` when a step fails; no step of the run is kept.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<MigrationOutcome> {
    let from_version = current_user_version(conn)?;
    let latest = latest_version();
    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }

    let outcome = MigrationOutcome {
        from_version,
        to_version: latest,
    };
    if outcome.applied() == 0 {
        return Ok(outcome);
    }

    let tx = conn.transaction()?;
    for (version, name, sql) in pending_steps(from_version) {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
        debug!("event=db_migrate_step module=db status=ok version={version} name={name}");
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={from_version} to_version={latest}"
    );
    Ok(outcome)
}

/// Schema version recorded on `conn`; 0 for a blank store.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

fn pending_steps(from_version: u32) -> impl Iterator<Item = (u32, &'static str, &'static str)> {
    STEPS
        .iter()
        .zip(1u32..)
        .skip(from_version as usize)
        .map(|(&(name, sql), version)| (version, name, sql))
}

#[cfg(test)]
mod tests {
    use super::{latest_version, pending_steps};

    #[test]
    fn blank_store_runs_every_step_in_order() {
        let versions: Vec<u32> = pending_steps(0).map(|(version, _, _)| version).collect();
        let expected: Vec<u32> = (1..=latest_version()).collect();
        assert_eq!(versions, expected);
    }

    #[test]
    fn current_store_has_nothing_pending() {
        assert_eq!(pending_steps(latest_version()).count(), 0);
    }

    #[test]
    fn first_step_creates_both_tables() {
        let (_, name, sql) = pending_steps(0).next().unwrap();
        assert_eq!(name, "init");
        assert!(sql.contains("CREATE TABLE article"));
        assert!(sql.contains("CREATE TABLE article_comment"));
    }
}
