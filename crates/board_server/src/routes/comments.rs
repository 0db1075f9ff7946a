//! Article comment resource handlers.

use crate::error::ApiError;
use crate::hal::{ArticleModel, CollectionModel, CommentModel, Hal, LinkBuilder, COMMENTS_REL};
use crate::params::page_request;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use board_core::{
    ArticleCommentId, ArticleId, CommentPatch, CommentSortField, RepoError, ServiceError,
};
use serde::Deserialize;

/// Owning article given either as a numeric id or as its resource URI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub(crate) enum ArticleRef {
    Id(ArticleId),
    Uri(String),
}

impl ArticleRef {
    fn resolve(&self) -> Result<ArticleId, ApiError> {
        match self {
            Self::Id(id) => Ok(*id),
            Self::Uri(uri) => parse_article_uri(uri)
                .ok_or_else(|| ApiError::BadRequest(format!("`{uri}` is not an article URI"))),
        }
    }
}

fn parse_article_uri(uri: &str) -> Option<ArticleId> {
    let path = uri.trim().trim_end_matches('/');
    let (prefix, id) = path.rsplit_once('/')?;
    if !prefix.ends_with("/articles") {
        return None;
    }
    id.parse().ok()
}

#[derive(Debug, Deserialize)]
pub(crate) struct NewComment {
    article: ArticleRef,
    content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentUpdate {
    #[serde(default)]
    article: Option<ArticleRef>,
    #[serde(default)]
    content: Option<String>,
}

/// A missing target article in a request body is a client error, not a 404
/// on the addressed resource.
fn referenced_article_error(err: ServiceError) -> ApiError {
    match err {
        ServiceError::Repo(RepoError::ArticleNotFound(id)) => {
            ApiError::BadRequest(format!("referenced article not found: {id}"))
        }
        other => other.into(),
    }
}

pub(crate) async fn list_comments(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Hal<CollectionModel<CommentModel>>, ApiError> {
    let links = LinkBuilder::from_headers(&headers);
    let request = page_request::<CommentSortField>(&query, state.paging())?;
    let page = state.with_board(|board| Ok(board.list_comments(&request)?))?;

    Ok(Hal::ok(CollectionModel::from_page(
        COMMENTS_REL,
        &page,
        &request,
        &links.comments(),
        |comment| CommentModel::from_comment(comment, &links),
    )))
}

pub(crate) async fn get_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<ArticleCommentId>,
) -> Result<Hal<CommentModel>, ApiError> {
    let links = LinkBuilder::from_headers(&headers);
    let comment = state
        .with_board(|board| Ok(board.get_comment(id)?))?
        .ok_or_else(|| ApiError::NotFound(format!("article comment not found: {id}")))?;
    Ok(Hal::ok(CommentModel::from_comment(&comment, &links)))
}

pub(crate) async fn get_comment_article(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<ArticleCommentId>,
) -> Result<Hal<ArticleModel>, ApiError> {
    let links = LinkBuilder::from_headers(&headers);
    let article = state.with_board(|board| {
        let comment = board
            .get_comment(id)?
            .ok_or_else(|| ApiError::NotFound(format!("article comment not found: {id}")))?;
        let article_id = comment.article_id();
        board.get_article(article_id)?.ok_or_else(|| {
            ApiError::NotFound(format!("article not found: {article_id}"))
        })
    })?;
    Ok(Hal::ok(ArticleModel::from_article(&article, &links)))
}

pub(crate) async fn create_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<NewComment>,
) -> Result<Hal<CommentModel>, ApiError> {
    let links = LinkBuilder::from_headers(&headers);
    let article_id = body.article.resolve()?;
    let comment = state.with_board(|board| {
        board
            .create_comment(article_id, &body.content)
            .map_err(referenced_article_error)
    })?;
    let model = CommentModel::from_comment(&comment, &links);
    let location = comment
        .id()
        .map(|id| links.comment(id))
        .ok_or_else(|| ApiError::Internal("created comment has no id".to_string()))?;
    Ok(Hal::created(model, location))
}

pub(crate) async fn update_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<ArticleCommentId>,
    Json(body): Json<CommentUpdate>,
) -> Result<Hal<CommentModel>, ApiError> {
    let links = LinkBuilder::from_headers(&headers);
    let patch = CommentPatch {
        content: body.content,
        article_id: body.article.as_ref().map(ArticleRef::resolve).transpose()?,
    };
    let comment = state.with_board(|board| {
        board
            .update_comment(id, &patch)
            .map_err(referenced_article_error)
    })?;
    Ok(Hal::ok(CommentModel::from_comment(&comment, &links)))
}

pub(crate) async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<ArticleCommentId>,
) -> Result<StatusCode, ApiError> {
    state.with_board(|board| Ok(board.delete_comment(id)?))?;
    Ok(StatusCode::NO_CONTENT)
}
