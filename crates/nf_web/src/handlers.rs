use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use nf_core::{Article, Interest};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::CurrentUser;
use crate::response::{ApiError, ApiResult, Envelope};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInterests {
    pub interest_ids: Vec<i64>,
}

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "running", "success": true }))
}

pub async fn list_interests(State(state): State<Arc<AppState>>) -> ApiResult<Envelope<Vec<Interest>>> {
    Ok(Envelope::data(state.interests.list_interests().await?))
}

pub async fn get_user_interests(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Envelope<Vec<Interest>>> {
    Ok(Envelope::data(state.interests.user_interests(user).await?))
}

pub async fn update_user_interests(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<UpdateInterests>,
) -> ApiResult<Envelope<Vec<Interest>>> {
    let interests = state.interests.set_user_interests(user, &body.interest_ids).await?;
    // Cached "all" lists were filtered by the old interests.
    state.news.invalidate_user(user);
    Ok(Envelope::data(interests).with_message("Interests updated successfully"))
}

pub async fn get_news(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<NewsQuery>,
) -> ApiResult<Envelope<Vec<Article>>> {
    let articles = state.news.news_for(user, query.category.as_deref()).await?;
    Ok(Envelope::data(articles))
}

pub async fn list_bookmarks(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Envelope<Vec<Article>>> {
    Ok(Envelope::data(state.bookmarks.bookmarks(user).await?))
}

pub async fn add_bookmark(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(article_id): Path<i64>,
) -> ApiResult<Envelope<()>> {
    state.bookmarks.add_bookmark(user, article_id).await?;
    Ok(Envelope::ok("Bookmark added"))
}

pub async fn remove_bookmark(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(article_id): Path<i64>,
) -> ApiResult<Envelope<()>> {
    if !state.bookmarks.remove_bookmark(user, article_id).await? {
        return Err(ApiError::NotFound("Bookmark not found".to_string()));
    }
    Ok(Envelope::ok("Bookmark removed"))
}
