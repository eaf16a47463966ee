use axum::{
    extract::{Path, State},
    Json,
};
use domain::Notification;
use serde::{Deserialize, Serialize};

use crate::http::error::{internal, not_found, parse_username, ApiResult};
use crate::render::NotificationItem;
use crate::state::AppState;

#[derive(Serialize)]
pub struct UnreadNotifications {
    pub unread: i64,
    pub items: Vec<NotificationItem>,
}

#[derive(Deserialize, Default)]
pub struct MarkReadRequest {
    // 下次渲染需要跳转的会话，缺省为通知接收者
    pub session: Option<String>,
}

pub async fn list_unread(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<UnreadNotifications>> {
    let username = parse_username(&username)?;
    let items: Vec<NotificationItem> = state
        .db
        .list_unread_notifications(&username)
        .await
        .map_err(internal)?
        .into_iter()
        .map(Into::into)
        .collect();
    let unread = state.db.count_unread(&username).await.map_err(internal)?;

    Ok(Json(UnreadNotifications { unread, items }))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Path(notification_id): Path<i64>,
    payload: Option<Json<MarkReadRequest>>,
) -> ApiResult<Json<Notification>> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    let notification = state
        .db
        .mark_notification_read(notification_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found("notification", notification_id))?;

    let session = payload
        .session
        .unwrap_or_else(|| notification.target_user.to_string());
    state.jumps.set(&session, notification.comment_id);

    Ok(Json(notification))
}
