use chrono::NaiveDateTime;
use domain::{Comment, Notification, NotificationDetail, Post, User, Username};
use sqlx::FromRow;

#[derive(FromRow)]
pub struct SqlPost {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub author: String,
    pub category: String,
    pub attachment: Option<String>,
    pub created_at: NaiveDateTime,
}

impl From<SqlPost> for Post {
    fn from(sql: SqlPost) -> Self {
        Post {
            id: sql.id,
            title: sql.title,
            body: sql.body,
            author: Username::new_unchecked(sql.author),
            category: sql.category,
            attachment: sql.attachment,
            created_at: sql.created_at,
        }
    }
}

#[derive(FromRow)]
pub struct SqlComment {
    pub id: i64,
    pub post_id: i64,
    pub parent_id: i64,
    pub author: String,
    pub body: String,
    pub attachment: Option<String>,
    pub created_at: NaiveDateTime,
}

impl From<SqlComment> for Comment {
    fn from(sql: SqlComment) -> Self {
        Comment {
            id: sql.id,
            post_id: sql.post_id,
            parent_id: sql.parent_id,
            author: Username::new_unchecked(sql.author),
            body: sql.body,
            attachment: sql.attachment,
            created_at: sql.created_at,
        }
    }
}

#[derive(FromRow)]
pub struct SqlUser {
    pub username: String,
    pub display_name: String,
    pub icon: Option<String>,
    pub last_active: NaiveDateTime,
}

impl From<SqlUser> for User {
    fn from(sql: SqlUser) -> Self {
        User {
            username: Username::new_unchecked(sql.username),
            display_name: sql.display_name,
            icon: sql.icon,
            last_active: sql.last_active,
        }
    }
}

// 在线列表行：用户 + 未读通知数
#[derive(FromRow)]
pub struct SqlRosterUser {
    #[sqlx(flatten)]
    pub user: SqlUser,
    pub unread: i64,
}

#[derive(FromRow)]
pub struct SqlNotification {
    pub id: i64,
    pub target_user: String,
    pub comment_id: i64,
    pub is_read: bool,
}

impl From<SqlNotification> for Notification {
    fn from(sql: SqlNotification) -> Self {
        Notification {
            id: sql.id,
            target_user: Username::new_unchecked(sql.target_user),
            comment_id: sql.comment_id,
            is_read: sql.is_read,
        }
    }
}

#[derive(FromRow)]
pub struct SqlNotificationDetail {
    pub id: i64,
    pub comment_id: i64,
    pub post_id: i64,
    pub post_title: String,
    pub comment_body: String,
}

impl From<SqlNotificationDetail> for NotificationDetail {
    fn from(sql: SqlNotificationDetail) -> Self {
        NotificationDetail {
            id: sql.id,
            comment_id: sql.comment_id,
            post_id: sql.post_id,
            post_title: sql.post_title,
            comment_body: sql.comment_body,
        }
    }
}
