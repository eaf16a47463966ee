use crate::models::{Comment, Notification, Post, Username};
use serde::{Deserialize, Serialize};

// 每次写操作提交后广播的变更事件
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum FeedEvent {
    PostCreated {
        post: Post,
    },
    PostDeleted {
        post_id: i64,
    },
    CommentCreated {
        comment: Comment,
    },
    CommentsDeleted {
        post_id: i64,
        comment_ids: Vec<i64>,
    },
    NotificationCreated {
        notification: Notification,
    },
    ProfileSaved {
        username: Username,
        display_name: String,
    },
    PresenceOnline {
        username: Username,
    },
}

impl FeedEvent {
    // 定向事件返回唯一接收者，None 表示广播给所有订阅者
    pub fn recipient(&self) -> Option<&Username> {
        match self {
            Self::NotificationCreated { notification } => Some(&notification.target_user),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::PostCreated { .. } => "post_created",
            Self::PostDeleted { .. } => "post_deleted",
            Self::CommentCreated { .. } => "comment_created",
            Self::CommentsDeleted { .. } => "comments_deleted",
            Self::NotificationCreated { .. } => "notification_created",
            Self::ProfileSaved { .. } => "profile_saved",
            Self::PresenceOnline { .. } => "presence_online",
        }
    }
}
