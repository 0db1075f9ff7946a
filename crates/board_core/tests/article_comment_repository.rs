use board_core::db::open_db_in_memory;
use board_core::{
    Article, ArticleComment, ArticleCommentRepository, ArticleRepository, AuditContext,
    CommentSortField, Direction, PageRequest, RepoError, SqliteArticleCommentRepository,
    SqliteArticleRepository, ValidationError,
};

fn audit(actor: &str, at: i64) -> AuditContext {
    AuditContext::new(actor, at).unwrap()
}

fn saved_article(repo: &SqliteArticleRepository<'_>, title: &str) -> Article {
    let mut article = Article::of(title, "body", None);
    repo.save(&mut article, &audit("seeder", 1_000)).unwrap();
    article
}

#[test]
fn saving_comment_assigns_id_and_audit_fields() {
    let conn = open_db_in_memory().unwrap();
    let articles = SqliteArticleRepository::try_new(&conn).unwrap();
    let comments = SqliteArticleCommentRepository::try_new(&conn).unwrap();
    let article = saved_article(&articles, "host");

    let mut comment = ArticleComment::of(&article, "first!").unwrap();
    let id = comments.save(&mut comment, &audit("uno", 5_000)).unwrap();

    let loaded = comments.find_by_id(id).unwrap().unwrap();
    assert_eq!(loaded.content(), "first!");
    assert_eq!(loaded.article_id(), article.id().unwrap());
    let fields = loaded.audit().unwrap();
    assert_eq!(fields.created_by(), "uno");
    assert_eq!(fields.created_at(), 5_000);
    assert!(loaded == comment);
}

#[test]
fn comment_for_deleted_article_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let articles = SqliteArticleRepository::try_new(&conn).unwrap();
    let comments = SqliteArticleCommentRepository::try_new(&conn).unwrap();
    let article = saved_article(&articles, "short lived");
    let mut comment = ArticleComment::of(&article, "too late").unwrap();
    articles.delete(&article).unwrap();

    let err = comments.save(&mut comment, &audit("uno", 1_000)).unwrap_err();
    assert!(matches!(err, RepoError::ArticleNotFound(id) if Some(id) == article.id()));
    assert_eq!(comments.count().unwrap(), 0);
}

#[test]
fn oversized_comment_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let articles = SqliteArticleRepository::try_new(&conn).unwrap();
    let comments = SqliteArticleCommentRepository::try_new(&conn).unwrap();
    let article = saved_article(&articles, "host");

    let mut comment = ArticleComment::of(&article, "y".repeat(501)).unwrap();
    let err = comments.save(&mut comment, &audit("uno", 1_000)).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::TooLong { max: 500, .. })
    ));
}

#[test]
fn deleting_comment_keeps_article() {
    let conn = open_db_in_memory().unwrap();
    let articles = SqliteArticleRepository::try_new(&conn).unwrap();
    let comments = SqliteArticleCommentRepository::try_new(&conn).unwrap();
    let article = saved_article(&articles, "host");
    let mut comment = ArticleComment::of(&article, "bye").unwrap();
    comments.save(&mut comment, &audit("uno", 1_000)).unwrap();

    comments.delete(&comment).unwrap();

    assert_eq!(comments.count().unwrap(), 0);
    assert_eq!(articles.count().unwrap(), 1);
    let reloaded = articles.find_by_id(article.id().unwrap()).unwrap().unwrap();
    assert!(reloaded.comments().is_empty());
    assert!(matches!(
        comments.delete(&comment).unwrap_err(),
        RepoError::CommentNotFound(_)
    ));
}

#[test]
fn updating_comment_can_move_it_to_another_article() {
    let conn = open_db_in_memory().unwrap();
    let articles = SqliteArticleRepository::try_new(&conn).unwrap();
    let comments = SqliteArticleCommentRepository::try_new(&conn).unwrap();
    let origin = saved_article(&articles, "origin");
    let destination = saved_article(&articles, "destination");

    let mut comment = ArticleComment::of(&origin, "wanderer").unwrap();
    comments.save(&mut comment, &audit("uno", 1_000)).unwrap();
    comment.set_article(&destination).unwrap();
    comment.set_content("settled");
    comments.save(&mut comment, &audit("mover", 2_000)).unwrap();

    let origin = articles.find_by_id(origin.id().unwrap()).unwrap().unwrap();
    let destination = articles.find_by_id(destination.id().unwrap()).unwrap().unwrap();
    assert!(origin.comments().is_empty());
    assert_eq!(destination.comments().len(), 1);
    assert_eq!(destination.comments()[0].content(), "settled");
    assert_eq!(destination.comments()[0].audit().unwrap().modified_by(), "mover");
    assert_eq!(destination.comments()[0].audit().unwrap().created_by(), "uno");
}

#[test]
fn find_by_article_id_pages_only_owned_comments() {
    let conn = open_db_in_memory().unwrap();
    let articles = SqliteArticleRepository::try_new(&conn).unwrap();
    let comments = SqliteArticleCommentRepository::try_new(&conn).unwrap();
    let owner = saved_article(&articles, "owner");
    let other = saved_article(&articles, "other");

    for index in 0..5 {
        let mut comment = ArticleComment::of(&owner, format!("owned {index}")).unwrap();
        comments.save(&mut comment, &audit("uno", 1_000)).unwrap();
    }
    let mut foreign = ArticleComment::of(&other, "foreign").unwrap();
    comments.save(&mut foreign, &audit("uno", 1_000)).unwrap();

    let request = PageRequest::of(0, Some(3)).sorted_by(CommentSortField::Id, Direction::Desc);
    let page = comments
        .find_by_article_id(owner.id().unwrap(), &request)
        .unwrap();
    assert_eq!(page.total_elements(), 5);
    assert_eq!(page.total_pages(), 2);
    let contents: Vec<&str> = page.content().iter().map(ArticleComment::content).collect();
    assert_eq!(contents, vec!["owned 4", "owned 3", "owned 2"]);

    let empty = comments
        .find_by_article_id(9_999, &PageRequest::default())
        .unwrap();
    assert_eq!(empty.total_elements(), 0);
    assert!(empty.content().is_empty());
}

#[test]
fn find_page_covers_all_comments() {
    let conn = open_db_in_memory().unwrap();
    let articles = SqliteArticleRepository::try_new(&conn).unwrap();
    let comments = SqliteArticleCommentRepository::try_new(&conn).unwrap();
    let first = saved_article(&articles, "first");
    let second = saved_article(&articles, "second");
    for article in [&first, &second] {
        let mut comment = ArticleComment::of(article, "hello").unwrap();
        comments.save(&mut comment, &audit("uno", 1_000)).unwrap();
    }

    let page = comments.find_page(&PageRequest::default()).unwrap();
    assert_eq!(page.total_elements(), 2);
    assert_eq!(page.size(), 20);
    assert_eq!(comments.find_all().unwrap().len(), 2);
}
