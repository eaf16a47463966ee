use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::{thread::Viewer, Comment, FeedEvent, NewComment, Notification};
use serde::{Deserialize, Serialize};
use storage::AttachmentScope;
use tracing::info;

use super::posts::ActorQuery;
use crate::http::error::{
    forbidden, internal, invalid, not_found, parse_username, ApiResult, AttachmentPayload,
};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ListCommentsQuery {
    #[serde(default)]
    pub parent: i64,
}

#[derive(Deserialize)]
pub struct CreateCommentRequest {
    pub author: String,
    pub body: String,
    #[serde(default)]
    pub parent_id: i64,
    pub attachment: Option<AttachmentPayload>,
}

#[derive(Serialize)]
pub struct CreateCommentResponse {
    pub comment: Comment,
    pub notifications: Vec<Notification>,
}

pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Query(query): Query<ListCommentsQuery>,
) -> ApiResult<Json<Vec<Comment>>> {
    let comments = state
        .db
        .list_comments(post_id, query.parent)
        .await
        .map_err(internal)?;
    Ok(Json(comments))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Json(payload): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<CreateCommentResponse>)> {
    let author = parse_username(&payload.author)?;
    let mut new_comment =
        NewComment::new(post_id, payload.parent_id, author, payload.body).map_err(invalid)?;

    if state.db.get_post(post_id).await.map_err(internal)?.is_none() {
        return Err(not_found("post", post_id));
    }
    if new_comment.parent_id != 0 {
        let parent = state
            .db
            .get_comment(new_comment.parent_id)
            .await
            .map_err(internal)?;
        if !parent.is_some_and(|p| p.post_id == post_id) {
            return Err(not_found("comment", new_comment.parent_id));
        }
    }

    if let Some(attachment) = payload.attachment {
        let upload = attachment.decode()?;
        let name = state
            .uploads
            .save_attachment(&new_comment.author, AttachmentScope::Comment, &upload)
            .await
            .map_err(internal)?;
        new_comment.attachment = Some(name);
    }

    let attachment = new_comment.attachment.clone();
    let (comment, notifications) = match state.db.create_comment(new_comment).await {
        Ok(created) => created,
        Err(e) => {
            if let Some(name) = attachment {
                state.uploads.remove(&name).await;
            }
            return Err(internal(e));
        }
    };
    info!(
        "Comment {} on post {} by {} ({} notification(s))",
        comment.id,
        post_id,
        comment.author,
        notifications.len()
    );

    state.publish(FeedEvent::CommentCreated {
        comment: comment.clone(),
    });
    for notification in &notifications {
        state.publish(FeedEvent::NotificationCreated {
            notification: notification.clone(),
        });
    }

    Ok((
        StatusCode::CREATED,
        Json(CreateCommentResponse {
            comment,
            notifications,
        }),
    ))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<i64>,
    Query(query): Query<ActorQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let actor = parse_username(&query.actor)?;

    let comment = state
        .db
        .get_comment(comment_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found("comment", comment_id))?;

    let viewer = Viewer {
        username: Some(&actor),
        admin: &state.admin_username,
    };
    if !viewer.can_delete(&comment.author) {
        return Err(forbidden(&actor));
    }

    let removed = state
        .db
        .delete_comment(comment_id)
        .await
        .map_err(internal)?;
    if removed.is_empty() {
        return Err(not_found("comment", comment_id));
    }
    info!("Comment {} deleted by {} ({} in thread)", comment_id, actor, removed.len());

    state.publish(FeedEvent::CommentsDeleted {
        post_id: comment.post_id,
        comment_ids: removed.clone(),
    });
    Ok(Json(serde_json::json!({ "deleted": removed })))
}
