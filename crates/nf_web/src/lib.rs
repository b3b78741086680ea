use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod handlers;
pub mod response;
pub mod state;

pub use auth::{CurrentUser, StaticTokenResolver};
pub use response::{ApiError, Envelope};
pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/", get(handlers::root))
        .route("/interests", get(handlers::list_interests))
        .route(
            "/users/me/interests",
            get(handlers::get_user_interests).put(handlers::update_user_interests),
        )
        .route("/news", get(handlers::get_news))
        .route("/bookmarks", get(handlers::list_bookmarks))
        .route(
            "/bookmarks/:article_id",
            post(handlers::add_bookmark).delete(handlers::remove_bookmark),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Bind `addr` and serve until `shutdown` resolves.
pub async fn serve<F>(app: Router, addr: &str, shutdown: F) -> nf_core::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    Ok(())
}

pub mod prelude {
    pub use super::{create_app, serve, AppState, StaticTokenResolver};
    pub use nf_core::{Error, Result};
}
