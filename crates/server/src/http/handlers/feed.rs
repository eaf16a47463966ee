use axum::{
    extract::{Query, State},
    Json,
};
use domain::PostFilter;
use serde::Deserialize;

use crate::http::error::{internal, parse_username, ApiResult};
use crate::render::{render_feed, FeedView};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct FeedQuery {
    pub viewer: Option<String>,
    pub session: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
}

pub async fn get_feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> ApiResult<Json<FeedView>> {
    let viewer = query
        .viewer
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(parse_username)
        .transpose()?;
    let filter = PostFilter::new(query.search, query.category);

    let view = render_feed(&state, viewer, query.session, &filter)
        .await
        .map_err(internal)?;
    Ok(Json(view))
}
