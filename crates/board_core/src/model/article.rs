//! Article entity.
//!
//! # Responsibility
//! - Hold one board post with its owned comment set.
//! - Enforce field rules through `validate()` before persistence.
//!
//! # Invariants
//! - `id` is assigned by the store on first insert and never changes.
//! - `comments` is ordered by ascending comment id and has no duplicates.
//! - Two articles are equal only when both are persisted with the same id.

use crate::model::article_comment::ArticleComment;
use crate::model::audit_fields::AuditFields;
use crate::model::validation::{require_max_chars, require_not_blank, ValidationError};
use serde::Serialize;
use std::hash::{Hash, Hasher};

/// Store-assigned surrogate key of an article.
pub type ArticleId = i64;

pub const ARTICLE_TITLE_MAX_CHARS: usize = 255;
pub const ARTICLE_CONTENT_MAX_CHARS: usize = 10_000;
pub const ARTICLE_HASHTAG_MAX_CHARS: usize = 255;

const ENTITY: &str = "article";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    id: Option<ArticleId>,
    title: String,
    content: String,
    hashtag: Option<String>,
    #[serde(flatten)]
    audit: Option<AuditFields>,
    #[serde(skip)]
    comments: Vec<ArticleComment>,
}

impl Article {
    /// Creates an unpersisted article from its required fields.
    pub fn of(title: impl Into<String>, content: impl Into<String>, hashtag: Option<&str>) -> Self {
        Self {
            id: None,
            title: title.into(),
            content: content.into(),
            hashtag: hashtag.map(str::to_string),
            audit: None,
            comments: Vec::new(),
        }
    }

    pub(crate) fn from_persisted(
        id: ArticleId,
        title: String,
        content: String,
        hashtag: Option<String>,
        audit: AuditFields,
    ) -> Self {
        Self {
            id: Some(id),
            title,
            content,
            hashtag,
            audit: Some(audit),
            comments: Vec::new(),
        }
    }

    pub fn id(&self) -> Option<ArticleId> {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn hashtag(&self) -> Option<&str> {
        self.hashtag.as_deref()
    }

    /// Audit metadata; `None` until the first successful write.
    pub fn audit(&self) -> Option<&AuditFields> {
        self.audit.as_ref()
    }

    /// Owned comments, ascending by id, as loaded with the article.
    pub fn comments(&self) -> &[ArticleComment] {
        &self.comments
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn set_hashtag(&mut self, hashtag: Option<&str>) {
        self.hashtag = hashtag.map(str::to_string);
    }

    /// Checks every column rule enforced by the `article` table.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_not_blank(ENTITY, "title", &self.title)?;
        require_max_chars(ENTITY, "title", &self.title, ARTICLE_TITLE_MAX_CHARS)?;
        require_not_blank(ENTITY, "content", &self.content)?;
        require_max_chars(ENTITY, "content", &self.content, ARTICLE_CONTENT_MAX_CHARS)?;
        if let Some(hashtag) = self.hashtag.as_deref() {
            require_max_chars(ENTITY, "hashtag", hashtag, ARTICLE_HASHTAG_MAX_CHARS)?;
        }
        Ok(())
    }

    pub(crate) fn mark_persisted(&mut self, id: ArticleId, audit: AuditFields) {
        self.id = Some(id);
        self.audit = Some(audit);
    }

    pub(crate) fn replace_comments(&mut self, mut comments: Vec<ArticleComment>) {
        comments.sort_by_key(|comment| comment.id());
        comments.dedup_by_key(|comment| comment.id());
        self.comments = comments;
    }
}

impl PartialEq for Article {
    fn eq(&self, other: &Self) -> bool {
        matches!((self.id, other.id), (Some(left), Some(right)) if left == right)
    }
}

impl Hash for Article {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::{Article, ARTICLE_CONTENT_MAX_CHARS};
    use crate::model::audit_fields::AuditFields;
    use crate::model::validation::ValidationError;

    fn persisted(id: i64, title: &str) -> Article {
        Article::from_persisted(
            id,
            title.to_string(),
            "body".to_string(),
            None,
            AuditFields::from_columns(1, "uno".to_string(), 1, "uno".to_string()),
        )
    }

    #[test]
    fn unpersisted_article_is_not_equal_to_itself() {
        let article = Article::of("title", "content", Some("#rust"));
        let copy = article.clone();
        assert!(!article.eq(&article));
        assert!(article != copy);
    }

    #[test]
    fn persisted_articles_compare_by_id_only() {
        assert!(persisted(7, "first") == persisted(7, "renamed"));
        assert!(persisted(7, "same") != persisted(8, "same"));
    }

    #[test]
    fn validate_rejects_blank_title() {
        let article = Article::of("  ", "content", None);
        assert_eq!(
            article.validate().unwrap_err(),
            ValidationError::BlankField {
                entity: "article",
                field: "title"
            }
        );
    }

    #[test]
    fn validate_counts_characters_not_bytes() {
        let at_limit = "가".repeat(ARTICLE_CONTENT_MAX_CHARS);
        assert!(Article::of("title", at_limit, None).validate().is_ok());

        let over = "a".repeat(ARTICLE_CONTENT_MAX_CHARS + 1);
        assert!(matches!(
            Article::of("title", over, None).validate(),
            Err(ValidationError::TooLong { field: "content", .. })
        ));
    }
}
