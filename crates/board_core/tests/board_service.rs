use board_core::db::open_db_in_memory;
use board_core::{
    ArticlePatch, ArticleRepository, AuditError, AuditorProvider, BoardService, CommentPatch,
    CommentSortField, FixedAuditor, PageRequest, RepoError, ServiceError,
    SqliteArticleCommentRepository, SqliteArticleRepository,
};
use rusqlite::Connection;
use std::sync::Arc;

fn service<'conn>(
    conn: &'conn Connection,
    auditor: Arc<dyn AuditorProvider>,
) -> BoardService<SqliteArticleRepository<'conn>, SqliteArticleCommentRepository<'conn>> {
    BoardService::new(
        SqliteArticleRepository::try_new(conn).unwrap(),
        SqliteArticleCommentRepository::try_new(conn).unwrap(),
        auditor,
    )
}

#[test]
fn writes_are_stamped_with_the_configured_auditor() {
    let conn = open_db_in_memory().unwrap();
    let board = service(&conn, Arc::new(FixedAuditor::new("uno")));

    let article = board
        .create_article("new article", "new content", Some("#spring"))
        .unwrap();
    let comment = board
        .create_comment(article.id().unwrap(), "nice post")
        .unwrap();

    assert_eq!(article.audit().unwrap().created_by(), "uno");
    assert_eq!(comment.audit().unwrap().created_by(), "uno");
    let fields = article.audit().unwrap();
    assert!(fields.created_at() > 0);
    assert_eq!(fields.created_at(), fields.modified_at());
}

#[test]
fn missing_auditor_blocks_the_write() {
    let conn = open_db_in_memory().unwrap();
    let nobody: Arc<dyn AuditorProvider> = Arc::new(|| -> Option<String> { None });
    let board = service(&conn, nobody);

    let err = board.create_article("title", "content", None).unwrap_err();
    assert!(matches!(err, ServiceError::Audit(AuditError::MissingAuditor)));
    let articles = SqliteArticleRepository::try_new(&conn).unwrap();
    assert_eq!(articles.count().unwrap(), 0);
}

#[test]
fn patching_article_changes_only_requested_fields() {
    let conn = open_db_in_memory().unwrap();
    let board = service(&conn, Arc::new(FixedAuditor::new("uno")));
    let created = board
        .create_article("title", "content", Some("#rust"))
        .unwrap();
    let id = created.id().unwrap();

    let patch = ArticlePatch {
        content: Some("rewritten".to_string()),
        hashtag: Some(None),
        ..ArticlePatch::default()
    };
    let updated = board.update_article(id, &patch).unwrap();

    assert_eq!(updated.title(), "title");
    assert_eq!(updated.content(), "rewritten");
    assert_eq!(updated.hashtag(), None);
    let stored = board.get_article(id).unwrap().unwrap();
    assert_eq!(stored.content(), "rewritten");
    assert_eq!(stored.hashtag(), None);
}

#[test]
fn updating_unknown_article_reports_not_found() {
    let conn = open_db_in_memory().unwrap();
    let board = service(&conn, Arc::new(FixedAuditor::default()));

    let err = board
        .update_article(404, &ArticlePatch::default())
        .unwrap_err();
    assert!(matches!(err, ServiceError::Repo(RepoError::ArticleNotFound(404))));
}

#[test]
fn nested_comment_listing_distinguishes_missing_article() {
    let conn = open_db_in_memory().unwrap();
    let board = service(&conn, Arc::new(FixedAuditor::default()));
    let article = board.create_article("title", "content", None).unwrap();
    let request = PageRequest::<CommentSortField>::default();

    let empty = board
        .list_article_comments(article.id().unwrap(), &request)
        .unwrap()
        .unwrap();
    assert_eq!(empty.total_elements(), 0);
    assert!(board.list_article_comments(999, &request).unwrap().is_none());
}

#[test]
fn comment_patch_and_delete_flow() {
    let conn = open_db_in_memory().unwrap();
    let board = service(&conn, Arc::new(FixedAuditor::default()));
    let first = board.create_article("first", "content", None).unwrap();
    let second = board.create_article("second", "content", None).unwrap();
    let comment = board
        .create_comment(first.id().unwrap(), "hello")
        .unwrap();
    let comment_id = comment.id().unwrap();

    let moved = board
        .update_comment(
            comment_id,
            &CommentPatch {
                content: None,
                article_id: second.id(),
            },
        )
        .unwrap();
    assert_eq!(moved.article_id(), second.id().unwrap());
    assert_eq!(moved.content(), "hello");

    let err = board
        .update_comment(
            comment_id,
            &CommentPatch {
                content: None,
                article_id: Some(12_345),
            },
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::Repo(RepoError::ArticleNotFound(12_345))));

    board.delete_comment(comment_id).unwrap();
    assert!(board.get_comment(comment_id).unwrap().is_none());
    assert!(board.get_article(second.id().unwrap()).unwrap().is_some());
}

#[test]
fn deleting_article_through_service_removes_comments() {
    let conn = open_db_in_memory().unwrap();
    let board = service(&conn, Arc::new(FixedAuditor::default()));
    let article = board.create_article("title", "content", None).unwrap();
    let id = article.id().unwrap();
    board.create_comment(id, "one").unwrap();
    board.create_comment(id, "two").unwrap();

    board.delete_article(id).unwrap();

    assert!(board.get_article(id).unwrap().is_none());
    let all = board.list_comments(&PageRequest::default()).unwrap();
    assert_eq!(all.total_elements(), 0);
}
