//! Core domain logic for the bulletin board.
//! This crate is the single source of truth for entity invariants and
//! persistence contracts.

pub mod audit;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use audit::{
    now_epoch_ms, AuditContext, AuditError, AuditorProvider, FixedAuditor, DEFAULT_AUDITOR,
};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::article::{Article, ArticleId};
pub use model::article_comment::{ArticleComment, ArticleCommentId};
pub use model::audit_fields::AuditFields;
pub use model::validation::ValidationError;
pub use repo::article_comment_repo::{
    ArticleCommentRepository, CommentSortField, SqliteArticleCommentRepository,
};
pub use repo::article_repo::{ArticleRepository, ArticleSortField, SqliteArticleRepository};
pub use repo::page::{Direction, Order, Page, PageRequest, SortField};
pub use repo::{RepoError, RepoResult};
pub use service::board_service::{
    ArticlePatch, BoardService, CommentPatch, ServiceError, ServiceResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
