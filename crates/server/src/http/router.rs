use super::handlers::{comments, feed, notifications, posts, sse, users};
use crate::render::UPLOADS_ROUTE;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

// 附件以 base64 形式放在 JSON 请求体中
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

const ALLOWED_METHODS: [Method; 4] = [Method::GET, Method::POST, Method::PUT, Method::DELETE];

pub fn build_router(state: AppState, allowed_origins: &str) -> Router {
    let cors = if allowed_origins == "*" {
        CorsLayer::new()
            .allow_methods(ALLOWED_METHODS)
            .allow_origin(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .filter_map(|s| s.parse::<HeaderValue>().ok())
            .collect();

        if origins.is_empty() {
            tracing::warn!("CORS config is invalid or empty, falling back to allow ANY.");
            CorsLayer::new()
                .allow_methods(ALLOWED_METHODS)
                .allow_origin(Any)
                .allow_headers(Any)
        } else {
            tracing::info!("CORS enabled for origins: {:?}", origins);
            CorsLayer::new()
                .allow_methods(ALLOWED_METHODS)
                .allow_origin(origins)
                .allow_headers(Any)
        }
    };

    let uploads = ServeDir::new(state.uploads.dir());

    Router::new()
        .route("/api/feed", get(feed::get_feed))
        .route("/api/events", get(sse::sse_handler))
        .route("/api/roster", get(users::roster))
        .route("/api/users/:username", put(users::save_profile))
        .route("/api/users/:username/activity", post(users::touch_activity))
        .route(
            "/api/users/:username/notifications",
            get(notifications::list_unread),
        )
        .route("/api/notifications/:id/read", post(notifications::mark_read))
        .route("/api/posts", get(posts::list_posts).post(posts::create_post))
        .route("/api/posts/:id", delete(posts::delete_post))
        .route(
            "/api/posts/:id/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route("/api/comments/:id", delete(comments::delete_comment))
        .nest_service(UPLOADS_ROUTE, uploads)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
