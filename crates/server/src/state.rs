use domain::presence::PresencePolicy;
use domain::FeedEvent;
use storage::{Db, Uploads};
use tokio::sync::broadcast;
use tracing::debug;

use crate::jump::JumpTargets;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub uploads: Uploads,
    pub tx_events: broadcast::Sender<FeedEvent>,
    pub jumps: JumpTargets,
    pub admin_username: String,
    pub presence: PresencePolicy,
}

impl AppState {
    // 没有订阅者时发送失败，不算错误
    pub fn publish(&self, event: FeedEvent) {
        let name = event.name();
        match self.tx_events.send(event) {
            Ok(n) => debug!("Published {} to {} subscriber(s)", name, n),
            Err(_) => debug!("Published {} with no subscribers", name),
        }
    }
}
