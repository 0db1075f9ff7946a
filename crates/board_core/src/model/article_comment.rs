//! Article comment entity.
//!
//! # Invariants
//! - Every comment references exactly one persisted article.
//! - Comments own nothing; deleting one never touches its article.

use crate::model::article::{Article, ArticleId};
use crate::model::audit_fields::AuditFields;
use crate::model::validation::{require_max_chars, require_not_blank, ValidationError};
use serde::Serialize;
use std::hash::{Hash, Hasher};

/// Store-assigned surrogate key of a comment.
pub type ArticleCommentId = i64;

pub const COMMENT_CONTENT_MAX_CHARS: usize = 500;

const ENTITY: &str = "article_comment";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleComment {
    id: Option<ArticleCommentId>,
    article_id: ArticleId,
    content: String,
    #[serde(flatten)]
    audit: Option<AuditFields>,
}

impl ArticleComment {
    /// Creates an unpersisted comment owned by `article`.
    ///
    /// # Errors
    /// - `UnpersistedArticle` when `article` has no id yet.
    pub fn of(article: &Article, content: impl Into<String>) -> Result<Self, ValidationError> {
        let article_id = article.id().ok_or(ValidationError::UnpersistedArticle)?;
        Ok(Self {
            id: None,
            article_id,
            content: content.into(),
            audit: None,
        })
    }

    pub(crate) fn from_persisted(
        id: ArticleCommentId,
        article_id: ArticleId,
        content: String,
        audit: AuditFields,
    ) -> Self {
        Self {
            id: Some(id),
            article_id,
            content,
            audit: Some(audit),
        }
    }

    pub fn id(&self) -> Option<ArticleCommentId> {
        self.id
    }

    /// Id of the owning article.
    pub fn article_id(&self) -> ArticleId {
        self.article_id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn audit(&self) -> Option<&AuditFields> {
        self.audit.as_ref()
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    /// Moves this comment under another persisted article.
    pub fn set_article(&mut self, article: &Article) -> Result<(), ValidationError> {
        self.article_id = article.id().ok_or(ValidationError::UnpersistedArticle)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_not_blank(ENTITY, "content", &self.content)?;
        require_max_chars(ENTITY, "content", &self.content, COMMENT_CONTENT_MAX_CHARS)
    }

    pub(crate) fn mark_persisted(&mut self, id: ArticleCommentId, audit: AuditFields) {
        self.id = Some(id);
        self.audit = Some(audit);
    }
}

impl PartialEq for ArticleComment {
    fn eq(&self, other: &Self) -> bool {
        matches!((self.id, other.id), (Some(left), Some(right)) if left == right)
    }
}

impl Hash for ArticleComment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
