//! Article comment repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD, count and paging APIs over `article_comment`.
//! - Serve the nested "article -> comments" read path.
//!
//! # Invariants
//! - A comment is only written when its owning article exists.
//! - Deleting a comment never touches the `article` table.

use crate::audit::AuditContext;
use crate::model::article::ArticleId;
use crate::model::article_comment::{ArticleComment, ArticleCommentId};
use crate::model::audit_fields::AuditFields;
use crate::repo::page::{Page, PageRequest, SortField};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use std::collections::HashMap;

const COMMENT_SELECT_SQL: &str = "SELECT
    id,
    article_id,
    content,
    created_at,
    created_by,
    modified_at,
    modified_by
FROM article_comment";

/// Article ids bound per `IN (...)` query; stays far below SQLite's variable limit.
const COMMENT_LOAD_BATCH: usize = 500;

/// Sortable comment properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentSortField {
    Id,
    Content,
    CreatedAt,
    CreatedBy,
    ModifiedAt,
    ModifiedBy,
}

impl SortField for CommentSortField {
    fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Content => "content",
            Self::CreatedAt => "created_at",
            Self::CreatedBy => "created_by",
            Self::ModifiedAt => "modified_at",
            Self::ModifiedBy => "modified_by",
        }
    }

    fn property(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Content => "content",
            Self::CreatedAt => "createdAt",
            Self::CreatedBy => "createdBy",
            Self::ModifiedAt => "modifiedAt",
            Self::ModifiedBy => "modifiedBy",
        }
    }

    fn parse(property: &str) -> Option<Self> {
        match property {
            "id" => Some(Self::Id),
            "content" => Some(Self::Content),
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

/// Repository interface for comment persistence.
pub trait ArticleCommentRepository {
    /// Inserts or updates `comment`, writing back id and audit fields.
    fn save(
        &self,
        comment: &mut ArticleComment,
        audit: &AuditContext,
    ) -> RepoResult<ArticleCommentId>;
    fn find_by_id(&self, id: ArticleCommentId) -> RepoResult<Option<ArticleComment>>;
    /// All comments ordered by id.
    fn find_all(&self) -> RepoResult<Vec<ArticleComment>>;
    fn find_page(
        &self,
        request: &PageRequest<CommentSortField>,
    ) -> RepoResult<Page<ArticleComment>>;
    /// Comments owned by one article; an unknown article yields an empty page.
    fn find_by_article_id(
        &self,
        article_id: ArticleId,
        request: &PageRequest<CommentSortField>,
    ) -> RepoResult<Page<ArticleComment>>;
    fn exists_by_id(&self, id: ArticleCommentId) -> RepoResult<bool>;
    fn count(&self) -> RepoResult<u64>;
    fn delete(&self, comment: &ArticleComment) -> RepoResult<()>;
    fn delete_by_id(&self, id: ArticleCommentId) -> RepoResult<()>;
}

/// SQLite-backed comment repository.
pub struct SqliteArticleCommentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteArticleCommentRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["article", "article_comment"])?;
        Ok(Self { conn })
    }

    fn insert(
        &self,
        comment: &mut ArticleComment,
        audit: &AuditContext,
    ) -> RepoResult<ArticleCommentId> {
        let fields = AuditFields::for_insert(audit);
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_article_exists(&tx, comment.article_id())?;
        tx.execute(
            "INSERT INTO article_comment (
                article_id,
                content,
                created_at,
                created_by,
                modified_at,
                modified_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                comment.article_id(),
                comment.content(),
                fields.created_at(),
                fields.created_by(),
                fields.modified_at(),
                fields.modified_by(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        comment.mark_persisted(id, fields);
        debug!(
            "event=comment_insert module=repo status=ok comment_id={id} article_id={}",
            comment.article_id()
        );
        Ok(id)
    }

    fn update(
        &self,
        id: ArticleCommentId,
        comment: &mut ArticleComment,
        audit: &AuditContext,
    ) -> RepoResult<ArticleCommentId> {
        let mut fields = comment.audit().cloned().ok_or_else(|| {
            RepoError::InvalidData(format!("comment {id} has an id but no audit fields"))
        })?;
        fields.touch(audit);

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_article_exists(&tx, comment.article_id())?;
        let changed = tx.execute(
            "UPDATE article_comment
             SET
                article_id = ?2,
                content = ?3,
                modified_at = ?4,
                modified_by = ?5
             WHERE id = ?1;",
            params![
                id,
                comment.article_id(),
                comment.content(),
                fields.modified_at(),
                fields.modified_by(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::CommentNotFound(id));
        }
        tx.commit()?;

        comment.mark_persisted(id, fields);
        debug!("event=comment_update module=repo status=ok comment_id={id}");
        Ok(id)
    }

    fn query_comments(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> RepoResult<Vec<ArticleComment>> {
        query_comments(self.conn, sql, params)
    }
}

impl ArticleCommentRepository for SqliteArticleCommentRepository<'_> {
    fn save(
        &self,
        comment: &mut ArticleComment,
        audit: &AuditContext,
    ) -> RepoResult<ArticleCommentId> {
        comment.validate()?;

        match comment.id() {
            Some(id) => self.update(id, comment, audit),
            None => self.insert(comment, audit),
        }
    }

    fn find_by_id(&self, id: ArticleCommentId) -> RepoResult<Option<ArticleComment>> {
        let mut comments =
            self.query_comments(&format!("{COMMENT_SELECT_SQL} WHERE id = ?1;"), [id])?;
        Ok(comments.pop())
    }

    fn find_all(&self) -> RepoResult<Vec<ArticleComment>> {
        self.query_comments(&format!("{COMMENT_SELECT_SQL} ORDER BY id ASC;"), [])
    }

    fn find_page(
        &self,
        request: &PageRequest<CommentSortField>,
    ) -> RepoResult<Page<ArticleComment>> {
        let total = self.count()?;
        let sql = format!(
            "{COMMENT_SELECT_SQL}{} LIMIT ?1 OFFSET ?2;",
            request.order_by_sql()
        );
        let comments =
            self.query_comments(&sql, params![i64::from(request.size()), request.offset()])?;
        Ok(Page::new(comments, request, total))
    }

    fn find_by_article_id(
        &self,
        article_id: ArticleId,
        request: &PageRequest<CommentSortField>,
    ) -> RepoResult<Page<ArticleComment>> {
        let total: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM article_comment WHERE article_id = ?1;",
            [article_id],
            |row| row.get(0),
        )?;
        let sql = format!(
            "{COMMENT_SELECT_SQL} WHERE article_id = ?1{} LIMIT ?2 OFFSET ?3;",
            request.order_by_sql()
        );
        let comments = self.query_comments(
            &sql,
            params![article_id, i64::from(request.size()), request.offset()],
        )?;
        Ok(Page::new(comments, request, total as u64))
    }

    fn exists_by_id(&self, id: ArticleCommentId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM article_comment WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn count(&self) -> RepoResult<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM article_comment;", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn delete(&self, comment: &ArticleComment) -> RepoResult<()> {
        let id = comment.id().ok_or(RepoError::NotPersisted("article_comment"))?;
        self.delete_by_id(id)
    }

    fn delete_by_id(&self, id: ArticleCommentId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let removed = tx.execute("DELETE FROM article_comment WHERE id = ?1;", [id])?;
        if removed == 0 {
            return Err(RepoError::CommentNotFound(id));
        }
        tx.commit()?;

        debug!("event=comment_delete module=repo status=ok comment_id={id}");
        Ok(())
    }
}

/// Loads the comments of the given articles, grouped by owning article id.
///
/// Ids are bound in batches of `COMMENT_LOAD_BATCH`; an article's comments
/// always come from a single batch, in ascending id order.
pub(crate) fn load_comments_by_article(
    conn: &Connection,
    article_ids: &[ArticleId],
) -> RepoResult<HashMap<ArticleId, Vec<ArticleComment>>> {
    let mut grouped: HashMap<ArticleId, Vec<ArticleComment>> = HashMap::new();
    if article_ids.is_empty() {
        return Ok(grouped);
    }

    for batch in article_ids.chunks(COMMENT_LOAD_BATCH) {
        let placeholders = vec!["?"; batch.len()].join(", ");
        let sql = format!(
            "{COMMENT_SELECT_SQL} WHERE article_id IN ({placeholders}) ORDER BY id ASC;"
        );
        let bind_values = batch.iter().map(|id| Value::Integer(*id));
        for comment in query_comments(conn, &sql, params_from_iter(bind_values))? {
            grouped.entry(comment.article_id()).or_default().push(comment);
        }
    }
    Ok(grouped)
}

fn query_comments(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> RepoResult<Vec<ArticleComment>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut comments = Vec::new();
    while let Some(row) = rows.next()? {
        comments.push(parse_comment_row(row)?);
    }
    Ok(comments)
}

fn ensure_article_exists(tx: &Transaction<'_>, article_id: ArticleId) -> RepoResult<()> {
    let exists: i64 = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM article WHERE id = ?1);",
        [article_id],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(RepoError::ArticleNotFound(article_id));
    }
    Ok(())
}

fn parse_comment_row(row: &Row<'_>) -> RepoResult<ArticleComment> {
    let id: ArticleCommentId = row.get("id")?;
    let audit = AuditFields::from_columns(
        row.get("created_at")?,
        row.get("created_by")?,
        row.get("modified_at")?,
        row.get("modified_by")?,
    );
    let comment =
        ArticleComment::from_persisted(id, row.get("article_id")?, row.get("content")?, audit);
    comment
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("article_comment {id}: {err}")))?;
    Ok(comment)
}
