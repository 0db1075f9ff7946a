//! Article repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD, count and paging APIs over the `article` table.
//! - Own the article -> comments cascade on delete.
//!
//! # Invariants
//! - `save` inserts when the entity has no id and updates otherwise.
//! - Inserts set all four audit columns; updates only the `modified_*` pair.
//! - Delete removes owned comments and the article in one immediate
//!   transaction; a failure leaves both tables untouched.
//! - Loaded articles always carry their full comment set.

use crate::audit::AuditContext;
use crate::model::article::{Article, ArticleId};
use crate::model::audit_fields::AuditFields;
use crate::repo::article_comment_repo::load_comments_by_article;
use crate::repo::page::{Page, PageRequest, SortField};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use log::debug;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

const ARTICLE_SELECT_SQL: &str = "SELECT
    id,
    title,
    content,
    hashtag,
    created_at,
    created_by,
    modified_at,
    modified_by
FROM article";

/// Sortable article properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleSortField {
    Id,
    Title,
    Content,
    Hashtag,
    CreatedAt,
    CreatedBy,
    ModifiedAt,
    ModifiedBy,
}

impl SortField for ArticleSortField {
    fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Content => "content",
            Self::Hashtag => "hashtag",
            Self::CreatedAt => "created_at",
            Self::CreatedBy => "created_by",
            Self::ModifiedAt => "modified_at",
            Self::ModifiedBy => "modified_by",
        }
    }

    fn property(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Content => "content",
            Self::Hashtag => "hashtag",
            Self::CreatedAt => "createdAt",
            Self::CreatedBy => "createdBy",
            Self::ModifiedAt => "modifiedAt",
            Self::ModifiedBy => "modifiedBy",
        }
    }

    fn parse(property: &str) -> Option<Self> {
        match property {
            "id" => Some(Self::Id),
            "title" => Some(Self::Title),
            "content" => Some(Self::Content),
            "hashtag" => Some(Self::Hashtag),
            "createdAt" => Some(Self::CreatedAt),
            "createdBy" => Some(Self::CreatedBy),
            "modifiedAt" => Some(Self::ModifiedAt),
            "modifiedBy" => Some(Self::ModifiedBy),
            _ => None,
        }
    }

    fn id() -> Self {
        Self::Id
    }
}

/// Repository interface for article persistence.
pub trait ArticleRepository {
    /// Inserts or updates `article`, writing back id and audit fields.
    fn save(&self, article: &mut Article, audit: &AuditContext) -> RepoResult<ArticleId>;
    fn find_by_id(&self, id: ArticleId) -> RepoResult<Option<Article>>;
    /// All articles ordered by id.
    fn find_all(&self) -> RepoResult<Vec<Article>>;
    fn find_page(&self, request: &PageRequest<ArticleSortField>) -> RepoResult<Page<Article>>;
    fn exists_by_id(&self, id: ArticleId) -> RepoResult<bool>;
    fn count(&self) -> RepoResult<u64>;
    /// Deletes `article` and every comment it owns.
    fn delete(&self, article: &Article) -> RepoResult<()>;
    fn delete_by_id(&self, id: ArticleId) -> RepoResult<()>;
}

/// SQLite-backed article repository.
pub struct SqliteArticleRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteArticleRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["article", "article_comment"])?;
        Ok(Self { conn })
    }

    fn insert(&self, article: &mut Article, audit: &AuditContext) -> RepoResult<ArticleId> {
        let fields = AuditFields::for_insert(audit);
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO article (
                title,
                content,
                hashtag,
                created_at,
                created_by,
                modified_at,
                modified_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                article.title(),
                article.content(),
                article.hashtag(),
                fields.created_at(),
                fields.created_by(),
                fields.modified_at(),
                fields.modified_by(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        article.mark_persisted(id, fields);
        debug!("event=article_insert module=repo status=ok article_id={id}");
        Ok(id)
    }

    fn update(
        &self,
        id: ArticleId,
        article: &mut Article,
        audit: &AuditContext,
    ) -> RepoResult<ArticleId> {
        let mut fields = article.audit().cloned().ok_or_else(|| {
            RepoError::InvalidData(format!("article {id} has an id but no audit fields"))
        })?;
        fields.touch(audit);

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE article
             SET
                title = ?2,
                content = ?3,
                hashtag = ?4,
                modified_at = ?5,
                modified_by = ?6
             WHERE id = ?1;",
            params![
                id,
                article.title(),
                article.content(),
                article.hashtag(),
                fields.modified_at(),
                fields.modified_by(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::ArticleNotFound(id));
        }
        tx.commit()?;

        article.mark_persisted(id, fields);
        debug!("event=article_update module=repo status=ok article_id={id}");
        Ok(id)
    }

    fn attach_comments(&self, articles: &mut [Article]) -> RepoResult<()> {
        let ids: Vec<ArticleId> = articles.iter().filter_map(Article::id).collect();
        let mut grouped = load_comments_by_article(self.conn, &ids)?;
        for article in articles.iter_mut() {
            if let Some(id) = article.id() {
                article.replace_comments(grouped.remove(&id).unwrap_or_default());
            }
        }
        Ok(())
    }

    fn query_articles(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> RepoResult<Vec<Article>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut articles = Vec::new();
        while let Some(row) = rows.next()? {
            articles.push(parse_article_row(row)?);
        }
        self.attach_comments(&mut articles)?;
        Ok(articles)
    }
}

impl ArticleRepository for SqliteArticleRepository<'_> {
    fn save(&self, article: &mut Article, audit: &AuditContext) -> RepoResult<ArticleId> {
        article.validate()?;

        match article.id() {
            Some(id) => self.update(id, article, audit),
            None => self.insert(article, audit),
        }
    }

    fn find_by_id(&self, id: ArticleId) -> RepoResult<Option<Article>> {
        let mut articles =
            self.query_articles(&format!("{ARTICLE_SELECT_SQL} WHERE id = ?1;"), [id])?;
        Ok(articles.pop())
    }

    fn find_all(&self) -> RepoResult<Vec<Article>> {
        self.query_articles(&format!("{ARTICLE_SELECT_SQL} ORDER BY id ASC;"), [])
    }

    fn find_page(&self, request: &PageRequest<ArticleSortField>) -> RepoResult<Page<Article>> {
        let total = self.count()?;
        let sql = format!(
            "{ARTICLE_SELECT_SQL}{} LIMIT ?1 OFFSET ?2;",
            request.order_by_sql()
        );
        let articles =
            self.query_articles(&sql, params![i64::from(request.size()), request.offset()])?;
        Ok(Page::new(articles, request, total))
    }

    fn exists_by_id(&self, id: ArticleId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM article WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn count(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM article;", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn delete(&self, article: &Article) -> RepoResult<()> {
        let id = article.id().ok_or(RepoError::NotPersisted("article"))?;
        self.delete_by_id(id)
    }

    fn delete_by_id(&self, id: ArticleId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let comments_removed = tx.execute(
            "DELETE FROM article_comment WHERE article_id = ?1;",
            [id],
        )?;
        let removed = tx.execute("DELETE FROM article WHERE id = ?1;", [id])?;
        if removed == 0 {
            return Err(RepoError::ArticleNotFound(id));
        }
        tx.commit()?;

        debug!(
            "event=article_delete module=repo status=ok article_id={id} comments_removed={comments_removed}"
        );
        Ok(())
    }
}

fn parse_article_row(row: &Row<'_>) -> RepoResult<Article> {
    let id: ArticleId = row.get("id")?;
    let audit = AuditFields::from_columns(
        row.get("created_at")?,
        row.get("created_by")?,
        row.get("modified_at")?,
        row.get("modified_by")?,
    );
    let article = Article::from_persisted(
        id,
        row.get("title")?,
        row.get("content")?,
        row.get("hashtag")?,
        audit,
    );
    article
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("article {id}: {err}")))?;
    Ok(article)
}
