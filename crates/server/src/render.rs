use chrono::{NaiveDateTime, Utc};
use domain::presence::{Presence, Roster};
use domain::thread::{build_thread, ThreadNode, Viewer};
use domain::{AttachmentKind, FeedEvent, NotificationDetail, Post, PostFilter, Username};
use serde::Serialize;
use tracing::info;

use crate::state::AppState;

pub const UPLOADS_ROUTE: &str = "/uploads";

#[derive(Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub attachment_kind: Option<AttachmentKind>,
    pub can_delete: bool,
    pub comments: Vec<ThreadNode>,
}

#[derive(Serialize)]
pub struct NotificationItem {
    #[serde(flatten)]
    pub detail: NotificationDetail,
    pub label: String,
}

impl From<NotificationDetail> for NotificationItem {
    fn from(detail: NotificationDetail) -> Self {
        Self {
            label: detail.label(),
            detail,
        }
    }
}

#[derive(Serialize)]
pub struct FeedView {
    pub viewer: Option<Username>,
    pub uploads_base: &'static str,
    pub posts: Vec<PostView>,
    pub roster: Roster,
    pub notifications: Vec<NotificationItem>,
    // 只在一次渲染中出现
    pub jump_to: Option<i64>,
}

// 记录活跃时间；用户从离线恢复时广播上线事件。未知用户忽略
pub async fn record_activity(state: &AppState, username: &Username) -> anyhow::Result<()> {
    let now = Utc::now().naive_utc();
    let Some(previous) = state.db.touch_user_activity(username).await? else {
        return Ok(());
    };
    if was_offline(state, previous, now) {
        info!("{} is online", username);
        state.publish(FeedEvent::PresenceOnline {
            username: username.clone(),
        });
    }
    Ok(())
}

fn was_offline(state: &AppState, previous: NaiveDateTime, now: NaiveDateTime) -> bool {
    state.presence.classify(previous, now) == Presence::Offline
}

pub async fn roster(state: &AppState) -> anyhow::Result<Roster> {
    let users = state.db.list_users_with_unread().await?;
    Ok(Roster::build(users, &state.presence, Utc::now().naive_utc()))
}

// 一次完整渲染：活跃心跳、帖子与评论树、在线列表、未读通知、跳转目标
pub async fn render_feed(
    state: &AppState,
    viewer: Option<Username>,
    session: Option<String>,
    filter: &PostFilter,
) -> anyhow::Result<FeedView> {
    if let Some(me) = &viewer {
        record_activity(state, me).await?;
    }

    let who = Viewer {
        username: viewer.as_ref(),
        admin: &state.admin_username,
    };

    let posts = state.db.list_posts(filter).await?;
    let mut views = Vec::with_capacity(posts.len());
    for post in posts {
        let comments = state.db.list_post_comments(post.id).await?;
        views.push(PostView {
            attachment_kind: post.attachment.as_deref().map(AttachmentKind::from_path),
            can_delete: who.can_delete(&post.author),
            comments: build_thread(comments, &who),
            post,
        });
    }

    let roster = roster(state).await?;

    let notifications = match &viewer {
        Some(me) => state
            .db
            .list_unread_notifications(me)
            .await?
            .into_iter()
            .map(Into::into)
            .collect(),
        None => Vec::new(),
    };

    let session_key = session.or_else(|| viewer.as_ref().map(|v| v.to_string()));
    let jump_to = session_key.and_then(|key| state.jumps.take(&key));

    Ok(FeedView {
        viewer,
        uploads_base: UPLOADS_ROUTE,
        posts: views,
        roster,
        notifications,
        jump_to,
    })
}
