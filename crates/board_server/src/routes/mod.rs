//! Router assembly and request logging.

use crate::hal::{Hal, LinkBuilder, RootModel};
use crate::state::AppState;
use axum::extract::Request;
use axum::http::HeaderMap;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use log::info;
use std::time::Instant;

mod articles;
mod comments;

/// Builds the `/api` router over `state`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api", get(root))
        .route(
            "/api/articles",
            get(articles::list_articles).post(articles::create_article),
        )
        .route(
            "/api/articles/{id}",
            get(articles::get_article)
                .patch(articles::update_article)
                .delete(articles::delete_article),
        )
        .route(
            "/api/articles/{id}/articleComments",
            get(articles::list_article_comments),
        )
        .route(
            "/api/articleComments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route(
            "/api/articleComments/{id}",
            get(comments::get_comment)
                .patch(comments::update_comment)
                .delete(comments::delete_comment),
        )
        .route(
            "/api/articleComments/{id}/article",
            get(comments::get_comment_article),
        )
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn root(headers: HeaderMap) -> Hal<RootModel> {
    Hal::ok(RootModel::new(&LinkBuilder::from_headers(&headers)))
}

async fn log_request(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let status = response.status();
    let outcome = if status.is_server_error() { "error" } else { "ok" };
    info!(
        "event=http_request module=server status={outcome} method={method} path={path} http_status={} duration_ms={}",
        status.as_u16(),
        started.elapsed().as_millis()
    );
    response
}
