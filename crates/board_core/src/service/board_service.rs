//! Board use-case service.
//!
//! # Responsibility
//! - Provide create/update/delete/read entry points for articles and comments.
//! - Resolve the audit actor once per write and hand it to repositories.
//!
//! # Invariants
//! - Service layer remains storage-agnostic.
//! - Updates load the current entity first, so unknown ids surface as
//!   `NotFound` before any audit context is captured.

use crate::audit::{AuditContext, AuditError, AuditorProvider};
use crate::model::article::{Article, ArticleId};
use crate::model::article_comment::{ArticleComment, ArticleCommentId};
use crate::repo::article_comment_repo::{ArticleCommentRepository, CommentSortField};
use crate::repo::article_repo::{ArticleRepository, ArticleSortField};
use crate::repo::page::{Page, PageRequest};
use crate::repo::RepoError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors from board service operations.
#[derive(Debug)]
pub enum ServiceError {
    /// No usable actor for the write.
    Audit(AuditError),
    /// Repository-level failure, including validation and not-found.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Audit(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Audit(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<AuditError> for ServiceError {
    fn from(value: AuditError) -> Self {
        Self::Audit(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<crate::model::validation::ValidationError> for ServiceError {
    fn from(value: crate::model::validation::ValidationError) -> Self {
        Self::Repo(RepoError::Validation(value))
    }
}

/// Partial update for an article; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticlePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    /// `Some(None)` clears the hashtag.
    pub hashtag: Option<Option<String>>,
}

/// Partial update for a comment; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentPatch {
    pub content: Option<String>,
    /// Moves the comment under another article.
    pub article_id: Option<ArticleId>,
}

/// Use-case service wrapper for article and comment operations.
pub struct BoardService<A: ArticleRepository, C: ArticleCommentRepository> {
    articles: A,
    comments: C,
    auditor: Arc<dyn AuditorProvider>,
}

impl<A: ArticleRepository, C: ArticleCommentRepository> BoardService<A, C> {
    pub fn new(articles: A, comments: C, auditor: Arc<dyn AuditorProvider>) -> Self {
        Self {
            articles,
            comments,
            auditor,
        }
    }

    fn audit_context(&self) -> ServiceResult<AuditContext> {
        AuditContext::capture(self.auditor.as_ref()).map_err(|err| {
            warn!("event=audit_capture module=service status=error error={err}");
            ServiceError::Audit(err)
        })
    }

    /// Creates and persists a new article.
    pub fn create_article(
        &self,
        title: &str,
        content: &str,
        hashtag: Option<&str>,
    ) -> ServiceResult<Article> {
        let mut article = Article::of(title, content, hashtag);
        let audit = self.audit_context()?;
        let id = self.articles.save(&mut article, &audit)?;
        info!(
            "event=article_save module=service status=ok op=create article_id={id} actor={}",
            audit.actor()
        );
        Ok(article)
    }

    /// Applies `patch` to an existing article.
    ///
    /// Returns `RepoError::ArticleNotFound` when `id` is unknown.
    pub fn update_article(&self, id: ArticleId, patch: &ArticlePatch) -> ServiceResult<Article> {
        let mut article = self
            .articles
            .find_by_id(id)?
            .ok_or(RepoError::ArticleNotFound(id))?;
        if let Some(title) = patch.title.as_deref() {
            article.set_title(title);
        }
        if let Some(content) = patch.content.as_deref() {
            article.set_content(content);
        }
        if let Some(hashtag) = patch.hashtag.as_ref() {
            article.set_hashtag(hashtag.as_deref());
        }

        let audit = self.audit_context()?;
        self.articles.save(&mut article, &audit)?;
        info!(
            "event=article_save module=service status=ok op=update article_id={id} actor={}",
            audit.actor()
        );
        Ok(article)
    }

    /// Deletes an article and every comment it owns.
    pub fn delete_article(&self, id: ArticleId) -> ServiceResult<()> {
        self.articles.delete_by_id(id)?;
        info!("event=article_delete module=service status=ok article_id={id}");
        Ok(())
    }

    pub fn get_article(&self, id: ArticleId) -> ServiceResult<Option<Article>> {
        Ok(self.articles.find_by_id(id)?)
    }

    pub fn list_articles(
        &self,
        request: &PageRequest<ArticleSortField>,
    ) -> ServiceResult<Page<Article>> {
        Ok(self.articles.find_page(request)?)
    }

    /// Lists comments of one article; `None` when the article does not exist.
    pub fn list_article_comments(
        &self,
        article_id: ArticleId,
        request: &PageRequest<CommentSortField>,
    ) -> ServiceResult<Option<Page<ArticleComment>>> {
        if !self.articles.exists_by_id(article_id)? {
            return Ok(None);
        }
        Ok(Some(self.comments.find_by_article_id(article_id, request)?))
    }

    /// Creates a comment under an existing article.
    pub fn create_comment(
        &self,
        article_id: ArticleId,
        content: &str,
    ) -> ServiceResult<ArticleComment> {
        let article = self
            .articles
            .find_by_id(article_id)?
            .ok_or(RepoError::ArticleNotFound(article_id))?;
        let mut comment = ArticleComment::of(&article, content)?;

        let audit = self.audit_context()?;
        let id = self.comments.save(&mut comment, &audit)?;
        info!(
            "event=comment_save module=service status=ok op=create comment_id={id} article_id={article_id} actor={}",
            audit.actor()
        );
        Ok(comment)
    }

    /// Applies `patch` to an existing comment.
    pub fn update_comment(
        &self,
        id: ArticleCommentId,
        patch: &CommentPatch,
    ) -> ServiceResult<ArticleComment> {
        let mut comment = self
            .comments
            .find_by_id(id)?
            .ok_or(RepoError::CommentNotFound(id))?;
        if let Some(content) = patch.content.as_deref() {
            comment.set_content(content);
        }
        if let Some(article_id) = patch.article_id {
            let article = self
                .articles
                .find_by_id(article_id)?
                .ok_or(RepoError::ArticleNotFound(article_id))?;
            comment.set_article(&article)?;
        }

        let audit = self.audit_context()?;
        self.comments.save(&mut comment, &audit)?;
        info!(
            "event=comment_save module=service status=ok op=update comment_id={id} actor={}",
            audit.actor()
        );
        Ok(comment)
    }

    /// Deletes one comment; its article is left untouched.
    pub fn delete_comment(&self, id: ArticleCommentId) -> ServiceResult<()> {
        self.comments.delete_by_id(id)?;
        info!("event=comment_delete module=service status=ok comment_id={id}");
        Ok(())
    }

    pub fn get_comment(&self, id: ArticleCommentId) -> ServiceResult<Option<ArticleComment>> {
        Ok(self.comments.find_by_id(id)?)
    }

    pub fn list_comments(
        &self,
        request: &PageRequest<CommentSortField>,
    ) -> ServiceResult<Page<ArticleComment>> {
        Ok(self.comments.find_page(request)?)
    }
}
