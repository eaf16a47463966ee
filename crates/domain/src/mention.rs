use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::models::Username;

fn mention_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@([A-Za-z0-9_]+)").expect("mention pattern is valid"))
}

pub fn mentioned_names(body: &str) -> Vec<&str> {
    mention_regex()
        .captures_iter(body)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str()))
        .collect()
}

// 需要通知的用户：父评论作者 + 被 @ 的用户，排除评论者，去重。
// 不校验被 @ 的用户是否存在
pub fn notification_targets(
    commenter: &Username,
    parent_author: Option<&Username>,
    body: &str,
) -> Vec<Username> {
    let mut targets: Vec<Username> = Vec::new();
    let candidates = parent_author
        .map(|u| u.as_str())
        .into_iter()
        .chain(mentioned_names(body));

    for name in candidates {
        if commenter == name || targets.iter().any(|t| t == name) {
            continue;
        }
        targets.push(Username::new_unchecked(name.to_string()));
    }
    targets
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum BodySegment {
    Text(String),
    Mention(String),
}

// 拆分评论正文，只高亮提及 viewer 的 @ 片段
pub fn highlight_mentions(body: &str, viewer: Option<&Username>) -> Vec<BodySegment> {
    let Some(viewer) = viewer else {
        return vec![BodySegment::Text(body.to_string())];
    };

    let mut segments = Vec::new();
    let mut cursor = 0;
    for cap in mention_regex().captures_iter(body) {
        let (Some(whole), Some(name)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        if viewer != name.as_str() {
            continue;
        }
        if whole.start() > cursor {
            segments.push(BodySegment::Text(body[cursor..whole.start()].to_string()));
        }
        segments.push(BodySegment::Mention(whole.as_str().to_string()));
        cursor = whole.end();
    }
    if cursor < body.len() || segments.is_empty() {
        segments.push(BodySegment::Text(body[cursor..].to_string()));
    }
    segments
}
