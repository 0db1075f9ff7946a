//! Shared handler state.
//!
//! # Invariants
//! - The connection mutex is held only for the synchronous service call;
//!   no `.await` happens while it is locked.

use crate::config::PagingConfig;
use crate::error::ApiError;
use board_core::{
    AuditorProvider, BoardService, SqliteArticleCommentRepository, SqliteArticleRepository,
};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// Board service bound to one borrowed connection.
pub type Board<'conn> =
    BoardService<SqliteArticleRepository<'conn>, SqliteArticleCommentRepository<'conn>>;

#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    auditor: Arc<dyn AuditorProvider>,
    paging: PagingConfig,
}

impl AppState {
    /// Wraps a migrated connection.
    pub fn new(conn: Connection, auditor: Arc<dyn AuditorProvider>, paging: PagingConfig) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            auditor,
            paging,
        }
    }

    pub fn paging(&self) -> PagingConfig {
        self.paging
    }

    /// Runs `op` against a board service over the locked connection.
    pub(crate) fn with_board<T>(
        &self,
        op: impl FnOnce(&Board<'_>) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let conn = self
            .db
            .lock()
            .map_err(|_| ApiError::Internal("database connection lock poisoned".to_string()))?;
        let board = BoardService::new(
            SqliteArticleRepository::try_new(&conn)?,
            SqliteArticleCommentRepository::try_new(&conn)?,
            Arc::clone(&self.auditor),
        );
        op(&board)
    }
}
