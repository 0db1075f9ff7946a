//! Board domain model: articles, their comments and shared audit metadata.
//!
//! # Invariants
//! - Entities are built through named factories only (`Article::of`,
//!   `ArticleComment::of`); identity and audit fields are never set by callers.
//! - Equality is identity-based and defined only for persisted entities.

pub mod article;
pub mod article_comment;
pub mod audit_fields;
pub mod validation;
