//! HAL representations for board resources.
//!
//! # Responsibility
//! - Render entities and pages as `application/hal+json` documents.
//! - Build absolute links from the request `Host` header.
//!
//! # Invariants
//! - Timestamps are rendered as RFC 3339 UTC with millisecond precision.
//! - Collection links reproduce the requested sort so paging is stable.

use axum::http::header::{CONTENT_TYPE, HOST, LOCATION};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use board_core::{
    Article, ArticleComment, ArticleCommentId, ArticleId, AuditFields, Page, PageRequest,
    SortField,
};
use chrono::{DateTime, SecondsFormat, Utc};
use log::error;
use serde::Serialize;
use std::collections::BTreeMap;

pub const HAL_JSON: &str = "application/hal+json";

pub const ARTICLES_REL: &str = "articles";
pub const COMMENTS_REL: &str = "articleComments";

/// `application/hal+json` response with an optional `Location` header.
pub struct Hal<T> {
    status: StatusCode,
    body: T,
    location: Option<String>,
}

impl<T: Serialize> Hal<T> {
    pub fn ok(body: T) -> Self {
        Self {
            status: StatusCode::OK,
            body,
            location: None,
        }
    }

    pub fn created(body: T, location: String) -> Self {
        Self {
            status: StatusCode::CREATED,
            body,
            location: Some(location),
        }
    }
}

impl<T: Serialize> IntoResponse for Hal<T> {
    fn into_response(self) -> Response {
        let bytes = match serde_json::to_vec(&self.body) {
            Ok(bytes) => bytes,
            Err(err) => {
                error!("event=hal_render module=server status=error error={err}");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };
        let mut response = (self.status, bytes).into_response();
        let headers = response.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(HAL_JSON));
        if let Some(location) = self.location {
            if let Ok(value) = HeaderValue::from_str(&location) {
                headers.insert(LOCATION, value);
            }
        }
        response
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub href: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub templated: bool,
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            templated: false,
        }
    }

    pub fn template(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            templated: true,
        }
    }
}

pub type Links = BTreeMap<&'static str, Link>;

/// Builds hrefs rooted at the scheme and host of the current request.
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    base: String,
}

impl LinkBuilder {
    /// Uses `http://<Host>` when the header is present, relative paths otherwise.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let base = headers
            .get(HOST)
            .and_then(|value| value.to_str().ok())
            .map(|host| format!("http://{host}"))
            .unwrap_or_default();
        Self { base }
    }

    pub fn api(&self, path: &str) -> String {
        format!("{}/api{path}", self.base)
    }

    pub fn articles(&self) -> String {
        self.api("/articles")
    }

    pub fn article(&self, id: ArticleId) -> String {
        self.api(&format!("/articles/{id}"))
    }

    pub fn article_comments(&self, id: ArticleId) -> String {
        self.api(&format!("/articles/{id}/articleComments"))
    }

    pub fn comments(&self) -> String {
        self.api("/articleComments")
    }

    pub fn comment(&self, id: ArticleCommentId) -> String {
        self.api(&format!("/articleComments/{id}"))
    }

    pub fn comment_article(&self, id: ArticleCommentId) -> String {
        self.api(&format!("/articleComments/{id}/article"))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditModel {
    pub created_at: String,
    pub created_by: String,
    pub modified_at: String,
    pub modified_by: String,
}

impl AuditModel {
    fn from_fields(fields: &AuditFields) -> Self {
        Self {
            created_at: format_timestamp(fields.created_at()),
            created_by: fields.created_by().to_string(),
            modified_at: format_timestamp(fields.modified_at()),
            modified_by: fields.modified_by().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleModel {
    pub id: Option<ArticleId>,
    pub title: String,
    pub content: String,
    pub hashtag: Option<String>,
    #[serde(flatten)]
    pub audit: Option<AuditModel>,
    #[serde(rename = "_links")]
    pub links: Links,
}

impl ArticleModel {
    pub fn from_article(article: &Article, links: &LinkBuilder) -> Self {
        let mut rels = Links::new();
        if let Some(id) = article.id() {
            rels.insert("self", Link::new(links.article(id)));
            rels.insert("article", Link::new(links.article(id)));
            rels.insert(COMMENTS_REL, Link::new(links.article_comments(id)));
        }
        Self {
            id: article.id(),
            title: article.title().to_string(),
            content: article.content().to_string(),
            hashtag: article.hashtag().map(str::to_string),
            audit: article.audit().map(AuditModel::from_fields),
            links: rels,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentModel {
    pub id: Option<ArticleCommentId>,
    pub content: String,
    #[serde(flatten)]
    pub audit: Option<AuditModel>,
    #[serde(rename = "_links")]
    pub links: Links,
}

impl CommentModel {
    pub fn from_comment(comment: &ArticleComment, links: &LinkBuilder) -> Self {
        let mut rels = Links::new();
        if let Some(id) = comment.id() {
            rels.insert("self", Link::new(links.comment(id)));
            rels.insert("articleComment", Link::new(links.comment(id)));
            rels.insert("article", Link::new(links.comment_article(id)));
        }
        Self {
            id: comment.id(),
            content: comment.content().to_string(),
            audit: comment.audit().map(AuditModel::from_fields),
            links: rels,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
    pub number: u32,
}

#[derive(Debug, Serialize)]
pub struct CollectionModel<T> {
    #[serde(rename = "_embedded")]
    pub embedded: BTreeMap<&'static str, Vec<T>>,
    #[serde(rename = "_links")]
    pub links: Links,
    pub page: PageMetadata,
}

impl<T> CollectionModel<T> {
    /// Wraps one page of models under `rel`, linking to its neighbours at `href`.
    pub fn from_page<E, F: SortField>(
        rel: &'static str,
        page: &Page<E>,
        request: &PageRequest<F>,
        href: &str,
        render: impl Fn(&E) -> T,
    ) -> Self {
        let items = page.content().iter().map(render).collect();
        let mut embedded = BTreeMap::new();
        embedded.insert(rel, items);

        let page_href = |number: u64| paged_href(href, number, request);
        let mut links = Links::new();
        links.insert("self", Link::new(page_href(u64::from(page.number()))));
        if page.total_pages() > 0 {
            links.insert("first", Link::new(page_href(0)));
            links.insert("last", Link::new(page_href(page.total_pages() - 1)));
        }
        if page.has_previous() {
            links.insert("prev", Link::new(page_href(u64::from(page.number()) - 1)));
        }
        if page.has_next() {
            links.insert("next", Link::new(page_href(u64::from(page.number()) + 1)));
        }

        Self {
            embedded,
            links,
            page: PageMetadata {
                size: page.size(),
                total_elements: page.total_elements(),
                total_pages: page.total_pages(),
                number: page.number(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RootModel {
    #[serde(rename = "_links")]
    pub links: Links,
}

impl RootModel {
    pub fn new(links: &LinkBuilder) -> Self {
        let mut rels = Links::new();
        rels.insert(
            ARTICLES_REL,
            Link::template(format!("{}{{?page,size,sort}}", links.articles())),
        );
        rels.insert(
            COMMENTS_REL,
            Link::template(format!("{}{{?page,size,sort}}", links.comments())),
        );
        Self { links: rels }
    }
}

fn paged_href<F: SortField>(href: &str, number: u64, request: &PageRequest<F>) -> String {
    let mut query = format!("{href}?page={number}&size={}", request.size());
    for order in request.sort() {
        query.push_str(&format!(
            "&sort={},{}",
            order.field.property(),
            order.direction.as_param()
        ));
    }
    query
}

/// Formats epoch milliseconds as `2024-01-31T12:00:00.000Z`.
pub fn format_timestamp(epoch_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms)
        .map(|at| at.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| epoch_ms.to_string())
}
