use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

pub const DEFAULT_CATEGORY: &str = "uncategorized";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    // 用户名同时用于 @ 提及和上传文件名前缀，只允许 ASCII 字母、数字和下划线
    pub fn new(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        if s.is_empty() {
            return Err(ValidationError::Empty("username"));
        }
        if !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ValidationError::InvalidUsername(s));
        }
        if s.len() > 64 {
            return Err(ValidationError::TooLong("username", 64));
        }
        Ok(Self(s))
    }

    pub fn new_unchecked(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<str> for Username {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub author: Username,
    pub category: String,
    pub attachment: Option<String>,
    pub created_at: NaiveDateTime,
}

// parent_id == 0 表示顶层评论
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub parent_id: i64,
    pub author: Username,
    pub body: String,
    pub attachment: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: Username,
    pub display_name: String,
    pub icon: Option<String>,
    pub last_active: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub target_user: Username,
    pub comment_id: i64,
    pub is_read: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationDetail {
    pub id: i64,
    pub comment_id: i64,
    pub post_id: i64,
    pub post_title: String,
    pub comment_body: String,
}

impl NotificationDetail {
    const EXCERPT_CHARS: usize = 20;

    // 通知面板标签：帖子标题 + 评论前 20 个字符
    pub fn label(&self) -> String {
        let excerpt: String = self.comment_body.chars().take(Self::EXCERPT_CHARS).collect();
        format!("{}: {}...", self.post_title, excerpt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Pdf,
}

impl AttachmentKind {
    pub fn from_path(path: &str) -> Self {
        if path.to_ascii_lowercase().ends_with(".pdf") {
            Self::Pdf
        } else {
            Self::Image
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rules() {
        assert!(Username::new("alice_01").is_ok());
        assert_eq!(Username::new(""), Err(ValidationError::Empty("username")));
        assert!(matches!(
            Username::new("../etc"),
            Err(ValidationError::InvalidUsername(_))
        ));
        assert!(Username::new("a".repeat(65)).is_err());
    }

    #[test]
    fn notification_label_truncates_by_chars() {
        let n = NotificationDetail {
            id: 1,
            comment_id: 2,
            post_id: 3,
            post_title: "Hello".into(),
            comment_body: "こんにちは、今日はいい天気ですね。明日も晴れるでしょう".into(),
        };
        assert_eq!(n.label(), "Hello: こんにちは、今日はいい天気ですね。明日も...");
    }

    #[test]
    fn attachment_kind_by_extension() {
        assert_eq!(AttachmentKind::from_path("uploads/a_post_1.PDF"), AttachmentKind::Pdf);
        assert_eq!(AttachmentKind::from_path("uploads/a_icon.png"), AttachmentKind::Image);
    }
}
