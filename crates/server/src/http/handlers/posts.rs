use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::{thread::Viewer, FeedEvent, NewPost, Post, PostFilter};
use serde::Deserialize;
use storage::AttachmentScope;
use tracing::info;

use crate::http::error::{
    forbidden, internal, invalid, not_found, parse_username, ApiResult, AttachmentPayload,
};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ListPostsQuery {
    pub search: Option<String>,
    pub category: Option<String>,
}

#[derive(Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub body: String,
    pub author: String,
    pub category: Option<String>,
    pub attachment: Option<AttachmentPayload>,
}

#[derive(Deserialize)]
pub struct ActorQuery {
    pub actor: String,
}

pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> ApiResult<Json<Vec<Post>>> {
    let filter = PostFilter::new(query.search, query.category);
    let posts = state.db.list_posts(&filter).await.map_err(internal)?;
    Ok(Json(posts))
}

pub async fn create_post(
    State(state): State<AppState>,
    Json(payload): Json<CreatePostRequest>,
) -> ApiResult<(StatusCode, Json<Post>)> {
    let author = parse_username(&payload.author)?;
    let mut new_post =
        NewPost::new(payload.title, payload.body, author, payload.category).map_err(invalid)?;

    if let Some(attachment) = payload.attachment {
        let upload = attachment.decode()?;
        let name = state
            .uploads
            .save_attachment(&new_post.author, AttachmentScope::Post, &upload)
            .await
            .map_err(internal)?;
        new_post.attachment = Some(name);
    }

    let attachment = new_post.attachment.clone();
    let post = match state.db.create_post(new_post).await {
        Ok(post) => post,
        Err(e) => {
            if let Some(name) = attachment {
                state.uploads.remove(&name).await;
            }
            return Err(internal(e));
        }
    };
    info!("Post {} created by {}", post.id, post.author);

    state.publish(FeedEvent::PostCreated { post: post.clone() });
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Query(query): Query<ActorQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let actor = parse_username(&query.actor)?;

    let post = state
        .db
        .get_post(post_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found("post", post_id))?;

    let viewer = Viewer {
        username: Some(&actor),
        admin: &state.admin_username,
    };
    if !viewer.can_delete(&post.author) {
        return Err(forbidden(&actor));
    }

    let removed = state
        .db
        .delete_post(post_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found("post", post_id))?;
    info!(
        "Post {} deleted by {} ({} comment(s) removed)",
        post_id,
        actor,
        removed.len()
    );

    state.publish(FeedEvent::PostDeleted { post_id });
    Ok(Json(serde_json::json!({
        "id": post_id,
        "deleted_comments": removed,
    })))
}
