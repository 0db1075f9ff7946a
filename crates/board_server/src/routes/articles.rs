//! Article resource handlers.

use crate::error::ApiError;
use crate::hal::{
    ArticleModel, CollectionModel, CommentModel, Hal, LinkBuilder, ARTICLES_REL, COMMENTS_REL,
};
use crate::params::page_request;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use board_core::{ArticleId, ArticlePatch, ArticleSortField, CommentSortField};
use serde::{Deserialize, Deserializer};

#[derive(Debug, Deserialize)]
pub(crate) struct NewArticle {
    title: String,
    content: String,
    #[serde(default)]
    hashtag: Option<String>,
}

/// PATCH body; an explicit `"hashtag": null` clears the hashtag.
#[derive(Debug, Deserialize)]
pub(crate) struct ArticleUpdate {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, deserialize_with = "present")]
    hashtag: Option<Option<String>>,
}

impl From<ArticleUpdate> for ArticlePatch {
    fn from(value: ArticleUpdate) -> Self {
        Self {
            title: value.title,
            content: value.content,
            hashtag: value.hashtag,
        }
    }
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

pub(crate) async fn list_articles(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Hal<CollectionModel<ArticleModel>>, ApiError> {
    let links = LinkBuilder::from_headers(&headers);
    let request = page_request::<ArticleSortField>(&query, state.paging())?;
    let page = state.with_board(|board| Ok(board.list_articles(&request)?))?;

    Ok(Hal::ok(CollectionModel::from_page(
        ARTICLES_REL,
        &page,
        &request,
        &links.articles(),
        |article| ArticleModel::from_article(article, &links),
    )))
}

pub(crate) async fn get_article(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<ArticleId>,
) -> Result<Hal<ArticleModel>, ApiError> {
    let links = LinkBuilder::from_headers(&headers);
    let article = state
        .with_board(|board| Ok(board.get_article(id)?))?
        .ok_or_else(|| ApiError::NotFound(format!("article not found: {id}")))?;
    Ok(Hal::ok(ArticleModel::from_article(&article, &links)))
}

pub(crate) async fn list_article_comments(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<ArticleId>,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Hal<CollectionModel<CommentModel>>, ApiError> {
    let links = LinkBuilder::from_headers(&headers);
    let request = page_request::<CommentSortField>(&query, state.paging())?;
    let page = state
        .with_board(|board| Ok(board.list_article_comments(id, &request)?))?
        .ok_or_else(|| ApiError::NotFound(format!("article not found: {id}")))?;

    Ok(Hal::ok(CollectionModel::from_page(
        COMMENTS_REL,
        &page,
        &request,
        &links.article_comments(id),
        |comment| CommentModel::from_comment(comment, &links),
    )))
}

pub(crate) async fn create_article(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<NewArticle>,
) -> Result<Hal<ArticleModel>, ApiError> {
    let links = LinkBuilder::from_headers(&headers);
    let article = state.with_board(|board| {
        Ok(board.create_article(&body.title, &body.content, body.hashtag.as_deref())?)
    })?;
    let model = ArticleModel::from_article(&article, &links);
    let location = article
        .id()
        .map(|id| links.article(id))
        .ok_or_else(|| ApiError::Internal("created article has no id".to_string()))?;
    Ok(Hal::created(model, location))
}

pub(crate) async fn update_article(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<ArticleId>,
    Json(body): Json<ArticleUpdate>,
) -> Result<Hal<ArticleModel>, ApiError> {
    let links = LinkBuilder::from_headers(&headers);
    let patch = ArticlePatch::from(body);
    let article = state.with_board(|board| Ok(board.update_article(id, &patch)?))?;
    Ok(Hal::ok(ArticleModel::from_article(&article, &links)))
}

pub(crate) async fn delete_article(
    State(state): State<AppState>,
    Path(id): Path<ArticleId>,
) -> Result<StatusCode, ApiError> {
    state.with_board(|board| Ok(board.delete_article(id)?))?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::ArticleUpdate;

    #[test]
    fn explicit_null_hashtag_clears_while_absent_keeps() {
        let cleared: ArticleUpdate = serde_json::from_str(r#"{"hashtag": null}"#).unwrap();
        assert_eq!(cleared.hashtag, Some(None));

        let untouched: ArticleUpdate = serde_json::from_str(r#"{"title": "t"}"#).unwrap();
        assert_eq!(untouched.hashtag, None);
        assert_eq!(untouched.title.as_deref(), Some("t"));
    }
}
