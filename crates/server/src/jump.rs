use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// 按会话保存跳转目标：阅读通知时写入，只被下一次渲染取走
#[derive(Clone, Default)]
pub struct JumpTargets {
    pending: Arc<Mutex<HashMap<String, i64>>>,
}

impl JumpTargets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, session: &str, comment_id: i64) {
        let mut map = self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        map.insert(session.to_string(), comment_id);
    }

    pub fn take(&self, session: &str) -> Option<i64> {
        let mut map = self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        map.remove(session)
    }
}
