use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use nf_core::{ArticleDraft, InterestStore, NewsSource, Result};
use nf_inference::models::dummy::DummyModel;
use nf_pipeline::{NewsService, Pipeline, ResponseCache};
use nf_storage::MemoryStore;
use nf_web::{create_app, AppState, StaticTokenResolver};
use serde_json::Value;
use tower::ServiceExt;

const TOKEN: &str = "secret-token";

#[derive(Default)]
struct CountingSource {
    calls: AtomicUsize,
}

#[async_trait]
impl NewsSource for CountingSource {
    fn name(&self) -> &str {
        "counting"
    }

    async fn fetch(&self, category: &str) -> Result<Vec<ArticleDraft>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![ArticleDraft::new(format!("https://news.test/{category}"), "Markets surge", category)
            .with_description("Strong growth lifts shares.")
            .with_source("counting")
            .with_published_at(Utc::now())])
    }
}

async fn app() -> (Router, Arc<CountingSource>) {
    let source = Arc::new(CountingSource::default());
    let store = Arc::new(MemoryStore::new());
    store.seed_interests(&["Technology", "Science"]).await.unwrap();

    let model = Arc::new(DummyModel::new());
    let pipeline = Pipeline::new(source.clone(), model.clone(), model, store.clone());
    let news = NewsService::new(
        Arc::new(pipeline),
        store.clone(),
        store.clone(),
        Arc::new(ResponseCache::new(Duration::from_secs(300))),
    );

    let state = AppState {
        news,
        interests: store.clone(),
        bookmarks: store,
        identity: Arc::new(StaticTokenResolver::default().with_token(TOKEN, 1)),
    };
    (create_app(state), source)
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_root_reports_running() {
    let (app, _) = app().await;
    let (status, body) = send(&app, request(Method::GET, "/", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({"message": "running", "success": true}));
}

#[tokio::test]
async fn test_news_requires_identity() {
    let (app, source) = app().await;

    for token in [None, Some("wrong")] {
        let (status, body) = send(&app, request(Method::GET, "/news?category=Technology", token, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, serde_json::json!({"success": false, "message": "Unauthorized"}));
    }
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cached_news_does_not_rerun_pipeline() {
    let (app, source) = app().await;

    let (status, body) = send(&app, request(Method::GET, "/news?category=Technology", Some(TOKEN), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"][0]["url"], "https://news.test/Technology");
    assert_eq!(body["data"][0]["sentiment"], "positive");
    assert_eq!(body["data"][0]["processing_status"], "completed");

    let (_, again) = send(&app, request(Method::GET, "/news?category=Technology", Some(TOKEN), None)).await;
    assert_eq!(again, body);
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_interests_and_bookmarks_flow() {
    let (app, _) = app().await;

    let (_, catalog) = send(&app, request(Method::GET, "/interests", None, None)).await;
    assert_eq!(catalog["data"].as_array().unwrap().len(), 2);

    let (status, updated) = send(
        &app,
        request(
            Method::PUT,
            "/users/me/interests",
            Some(TOKEN),
            Some(serde_json::json!({"interest_ids": [2, 99]})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"], serde_json::json!([{"id": 2, "name": "Science"}]));

    let (_, news) = send(&app, request(Method::GET, "/news", Some(TOKEN), None)).await;
    let article_id = news["data"][0]["id"].as_i64().unwrap();
    assert_eq!(news["data"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, request(Method::POST, &format!("/bookmarks/{article_id}"), Some(TOKEN), None)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, marks) = send(&app, request(Method::GET, "/bookmarks", Some(TOKEN), None)).await;
    assert_eq!(marks["data"][0]["id"], article_id);

    let (status, missing) = send(&app, request(Method::POST, "/bookmarks/4242", Some(TOKEN), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(missing["success"], false);

    let (status, _) = send(&app, request(Method::DELETE, &format!("/bookmarks/{article_id}"), Some(TOKEN), None)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, request(Method::DELETE, &format!("/bookmarks/{article_id}"), Some(TOKEN), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
