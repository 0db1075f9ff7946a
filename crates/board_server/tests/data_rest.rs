use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use board_core::db::open_db_in_memory;
use board_core::{
    AuditorProvider, BoardService, FixedAuditor, SqliteArticleCommentRepository,
    SqliteArticleRepository,
};
use board_server::{build_router, AppState, PagingConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const HAL_JSON: &str = "application/hal+json";

/// Two articles; the first owns two comments, the second one.
fn seeded_app() -> Router {
    let conn = open_db_in_memory().unwrap();
    {
        let seeder: Arc<dyn AuditorProvider> = Arc::new(FixedAuditor::new("seeder"));
        let board = BoardService::new(
            SqliteArticleRepository::try_new(&conn).unwrap(),
            SqliteArticleCommentRepository::try_new(&conn).unwrap(),
            seeder,
        );
        let first = board.create_article("first", "first body", Some("#rust")).unwrap();
        let second = board.create_article("second", "second body", None).unwrap();
        board.create_comment(first.id().unwrap(), "nice").unwrap();
        board.create_comment(first.id().unwrap(), "agreed").unwrap();
        board.create_comment(second.id().unwrap(), "hello").unwrap();
    }
    let auditor: Arc<dyn AuditorProvider> = Arc::new(FixedAuditor::new("uno"));
    build_router(AppState::new(conn, auditor, PagingConfig::default()))
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn get(app: &Router, uri: &str) -> Response {
    send(
        app,
        Request::builder()
            .uri(uri)
            .header("host", "localhost:8080")
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Value) -> Response {
    send(
        app,
        Request::builder()
            .method(method)
            .uri(uri)
            .header("host", "localhost:8080")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn content_type(response: &Response) -> &str {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

#[tokio::test]
async fn read_endpoints_answer_with_hal_json() {
    let app = seeded_app();
    for uri in [
        "/api",
        "/api/articles",
        "/api/articles/1",
        "/api/articles/1/articleComments",
        "/api/articleComments",
        "/api/articleComments/1",
        "/api/articleComments/1/article",
    ] {
        let response = get(&app, uri).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
        assert_eq!(content_type(&response), HAL_JSON, "GET {uri}");
    }
}

#[tokio::test]
async fn article_collection_embeds_items_and_page_metadata() {
    let app = seeded_app();
    let body = json_body(get(&app, "/api/articles?sort=title,desc").await).await;

    let articles = body["_embedded"]["articles"].as_array().unwrap();
    assert_eq!(articles.len(), 2);
    assert_eq!(articles[0]["title"], "second");
    assert_eq!(articles[1]["hashtag"], "#rust");
    assert_eq!(articles[1]["createdBy"], "seeder");
    assert_eq!(
        articles[1]["_links"]["articleComments"]["href"],
        "http://localhost:8080/api/articles/1/articleComments"
    );
    assert_eq!(body["page"]["totalElements"], 2);
    assert_eq!(body["page"]["size"], 20);
    assert_eq!(body["page"]["number"], 0);
}

#[tokio::test]
async fn small_pages_link_to_their_neighbours() {
    let app = seeded_app();
    let body = json_body(get(&app, "/api/articleComments?size=1&page=1").await).await;

    assert_eq!(body["page"]["totalPages"], 3);
    assert_eq!(body["_embedded"]["articleComments"][0]["content"], "agreed");
    let links = &body["_links"];
    assert_eq!(
        links["prev"]["href"],
        "http://localhost:8080/api/articleComments?page=0&size=1"
    );
    assert_eq!(
        links["next"]["href"],
        "http://localhost:8080/api/articleComments?page=2&size=1"
    );
    assert_eq!(
        links["last"]["href"],
        "http://localhost:8080/api/articleComments?page=2&size=1"
    );
}

#[tokio::test]
async fn nested_comments_only_list_the_owning_article() {
    let app = seeded_app();
    let body = json_body(get(&app, "/api/articles/1/articleComments").await).await;

    let contents: Vec<&str> = body["_embedded"]["articleComments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|comment| comment["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["nice", "agreed"]);
}

#[tokio::test]
async fn unknown_ids_answer_not_found() {
    let app = seeded_app();
    for uri in [
        "/api/articles/99",
        "/api/articles/99/articleComments",
        "/api/articleComments/99",
        "/api/articleComments/99/article",
    ] {
        assert_eq!(get(&app, uri).await.status(), StatusCode::NOT_FOUND, "GET {uri}");
    }
}

#[tokio::test]
async fn bad_paging_parameters_are_rejected() {
    let app = seeded_app();
    let response = get(&app, "/api/articles?sort=author,asc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["status"], 400);

    assert_eq!(
        get(&app, "/api/articleComments?page=first").await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn creating_article_stamps_configured_auditor() {
    let app = seeded_app();
    let response = send_json(
        &app,
        "POST",
        "/api/articles",
        json!({"title": "new article", "content": "new content", "hashtag": "#spring"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers().get(LOCATION).unwrap(),
        "http://localhost:8080/api/articles/3"
    );
    let body = json_body(response).await;
    assert_eq!(body["createdBy"], "uno");
    assert_eq!(body["modifiedBy"], "uno");

    let listing = json_body(get(&app, "/api/articles").await).await;
    assert_eq!(listing["page"]["totalElements"], 3);
}

#[tokio::test]
async fn invalid_article_is_a_bad_request() {
    let app = seeded_app();
    let response = send_json(
        &app,
        "POST",
        "/api/articles",
        json!({"title": "   ", "content": "body"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn patching_hashtag_keeps_creation_audit() {
    let app = seeded_app();
    let response = send_json(
        &app,
        "PATCH",
        "/api/articles/1",
        json!({"hashtag": "#springboot"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(get(&app, "/api/articles/1").await).await;
    assert_eq!(body["hashtag"], "#springboot");
    assert_eq!(body["title"], "first");
    assert_eq!(body["createdBy"], "seeder");
    assert_eq!(body["modifiedBy"], "uno");

    let missing = send_json(&app, "PATCH", "/api/articles/99", json!({"title": "x"})).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_article_cascades_to_comments() {
    let app = seeded_app();
    let response = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri("/api/articles/1")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert_eq!(get(&app, "/api/articles/1").await.status(), StatusCode::NOT_FOUND);
    let comments = json_body(get(&app, "/api/articleComments").await).await;
    assert_eq!(comments["page"]["totalElements"], 1);
    assert_eq!(comments["_embedded"]["articleComments"][0]["content"], "hello");
}

#[tokio::test]
async fn comment_lifecycle_through_article_uri() {
    let app = seeded_app();
    let created = send_json(
        &app,
        "POST",
        "/api/articleComments",
        json!({"article": "http://localhost:8080/api/articles/2", "content": "late reply"}),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let location = created
        .headers()
        .get(LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(location, "http://localhost:8080/api/articleComments/4");

    let moved = send_json(
        &app,
        "PATCH",
        "/api/articleComments/4",
        json!({"article": 1, "content": "moved reply"}),
    )
    .await;
    assert_eq!(moved.status(), StatusCode::OK);
    let owner = json_body(get(&app, "/api/articleComments/4/article").await).await;
    assert_eq!(owner["title"], "first");

    let deleted = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri("/api/articleComments/4")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
    assert_eq!(get(&app, "/api/articles/1").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn comment_for_unknown_article_is_a_bad_request() {
    let app = seeded_app();
    let response = send_json(
        &app,
        "POST",
        "/api/articleComments",
        json!({"article": "/api/articles/99", "content": "orphan"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
