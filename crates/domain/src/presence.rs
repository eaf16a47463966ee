use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::User;

pub const DEFAULT_ONLINE_WINDOW_SECS: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Online,
    Offline,
}

#[derive(Debug, Clone, Copy)]
pub struct PresencePolicy {
    window: Duration,
}

impl Default for PresencePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ONLINE_WINDOW_SECS)
    }
}

impl PresencePolicy {
    pub fn new(window_secs: i64) -> Self {
        Self {
            window: Duration::seconds(window_secs.max(0)),
        }
    }

    // now - last_active < window 视为在线
    pub fn classify(&self, last_active: NaiveDateTime, now: NaiveDateTime) -> Presence {
        if now - last_active < self.window {
            Presence::Online
        } else {
            Presence::Offline
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    pub user: User,
    pub presence: Presence,
    pub unread: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roster {
    pub member_count: usize,
    pub entries: Vec<RosterEntry>,
}

impl Roster {
    // users 需按注册顺序传入，在线组和离线组内部保持该顺序
    pub fn build(users: Vec<(User, i64)>, policy: &PresencePolicy, now: NaiveDateTime) -> Self {
        let member_count = users.len();
        let (online, offline): (Vec<_>, Vec<_>) = users
            .into_iter()
            .map(|(user, unread)| RosterEntry {
                presence: policy.classify(user.last_active, now),
                user,
                unread,
            })
            .partition(|e| e.presence == Presence::Online);

        Self {
            member_count,
            entries: online.into_iter().chain(offline).collect(),
        }
    }

    pub fn online_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.presence == Presence::Online)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Username;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn user(name: &str, secs_ago: i64) -> User {
        User {
            username: Username::new(name).unwrap(),
            display_name: name.to_uppercase(),
            icon: None,
            last_active: now() - Duration::seconds(secs_ago),
        }
    }

    #[test]
    fn ten_second_window() {
        let policy = PresencePolicy::default();
        assert_eq!(policy.classify(now() - Duration::seconds(5), now()), Presence::Online);
        assert_eq!(policy.classify(now() - Duration::seconds(15), now()), Presence::Offline);
        assert_eq!(policy.classify(now() - Duration::seconds(10), now()), Presence::Offline);
    }

    #[test]
    fn roster_puts_online_first_in_insertion_order() {
        let users = vec![
            (user("zed", 60), 0),
            (user("bob", 1), 2),
            (user("amy", 30), 1),
            (user("cat", 3), 0),
        ];
        let roster = Roster::build(users, &PresencePolicy::default(), now());
        let names: Vec<&str> = roster.entries.iter().map(|e| e.user.username.as_str()).collect();
        assert_eq!(names, vec!["bob", "cat", "zed", "amy"]);
        assert_eq!(roster.member_count, 4);
        assert_eq!(roster.online_count(), 2);
        assert_eq!(roster.entries[0].unread, 2);
    }
}
