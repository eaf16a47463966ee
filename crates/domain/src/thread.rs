use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::mention::{highlight_mentions, BodySegment};
use crate::models::{AttachmentKind, Comment, Username};

#[derive(Debug, Clone)]
pub struct Viewer<'a> {
    pub username: Option<&'a Username>,
    pub admin: &'a str,
}

impl Viewer<'_> {
    pub fn can_delete(&self, author: &Username) -> bool {
        match self.username {
            Some(me) => me == author || me == self.admin,
            None => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadNode {
    pub id: i64,
    pub parent_id: i64,
    pub depth: usize,
    pub author: Username,
    pub created_at: chrono::NaiveDateTime,
    pub segments: Vec<BodySegment>,
    pub attachment: Option<String>,
    pub attachment_kind: Option<AttachmentKind>,
    pub can_delete: bool,
    pub replies: Vec<ThreadNode>,
}

// 按 parent_id 组装回复树，兄弟节点保持传入顺序；父节点缺失的评论直接丢弃
pub fn build_thread(comments: Vec<Comment>, viewer: &Viewer<'_>) -> Vec<ThreadNode> {
    let mut children: HashMap<i64, Vec<Comment>> = HashMap::new();
    for c in comments {
        children.entry(c.parent_id).or_default().push(c);
    }
    attach(0, 0, &mut children, viewer)
}

fn attach(
    parent_id: i64,
    depth: usize,
    children: &mut HashMap<i64, Vec<Comment>>,
    viewer: &Viewer<'_>,
) -> Vec<ThreadNode> {
    let Some(level) = children.remove(&parent_id) else {
        return Vec::new();
    };
    level
        .into_iter()
        .map(|c| {
            let replies = attach(c.id, depth + 1, children, viewer);
            ThreadNode {
                id: c.id,
                parent_id: c.parent_id,
                depth,
                segments: highlight_mentions(&c.body, viewer.username),
                attachment_kind: c.attachment.as_deref().map(AttachmentKind::from_path),
                attachment: c.attachment,
                can_delete: viewer.can_delete(&c.author),
                author: c.author,
                created_at: c.created_at,
                replies,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn flatten(nodes: &[ThreadNode]) -> Vec<&ThreadNode> {
        let mut out = Vec::new();
        let mut stack: Vec<&ThreadNode> = nodes.iter().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.replies.iter().rev());
        }
        out
    }

    fn comment(id: i64, parent_id: i64, author: &str, body: &str) -> Comment {
        Comment {
            id,
            post_id: 1,
            parent_id,
            author: Username::new(author).unwrap(),
            body: body.to_string(),
            attachment: None,
            created_at: NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
        }
    }

    #[test]
    fn builds_depth_first_tree() {
        let comments = vec![
            comment(1, 0, "alice", "first"),
            comment(2, 1, "bob", "reply"),
            comment(3, 0, "carol", "second"),
            comment(4, 2, "alice", "deeper"),
            comment(5, 1, "carol", "another reply"),
        ];
        let me = Username::new("alice").unwrap();
        let viewer = Viewer {
            username: Some(&me),
            admin: "admin",
        };
        let tree = build_thread(comments, &viewer);

        let order: Vec<(i64, usize)> = flatten(&tree).iter().map(|n| (n.id, n.depth)).collect();
        assert_eq!(order, vec![(1, 0), (2, 1), (4, 2), (5, 1), (3, 0)]);
        assert!(tree[0].can_delete);
        assert!(!tree[1].can_delete);
    }

    #[test]
    fn orphans_are_not_rendered() {
        let comments = vec![comment(1, 0, "alice", "root"), comment(7, 99, "bob", "lost")];
        let viewer = Viewer {
            username: None,
            admin: "admin",
        };
        let tree = build_thread(comments, &viewer);
        assert_eq!(flatten(&tree).len(), 1);
        assert!(!tree[0].can_delete);
    }

    #[test]
    fn admin_can_delete_anything() {
        let admin = Username::new("admin").unwrap();
        let viewer = Viewer {
            username: Some(&admin),
            admin: "admin",
        };
        assert!(viewer.can_delete(&Username::new("bob").unwrap()));
    }
}
