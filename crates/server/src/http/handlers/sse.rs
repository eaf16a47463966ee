use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use domain::{FeedEvent, Username};
use futures::stream::Stream;
use serde::Deserialize;
use tokio_stream::{wrappers::BroadcastStream, StreamExt};

use crate::http::error::{parse_username, ApiResult};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct EventsQuery {
    pub viewer: Option<String>,
}

// 全站事件发给所有人，通知只发给接收者
fn is_visible(event: &FeedEvent, viewer: Option<&Username>) -> bool {
    match event.recipient() {
        None => true,
        Some(recipient) => viewer == Some(recipient),
    }
}

pub async fn sse_handler(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, axum::Error>>>> {
    let viewer = query
        .viewer
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(parse_username)
        .transpose()?;
    let rx = state.tx_events.subscribe();

    tracing::info!(
        "SSE Connected: viewer={}",
        viewer.as_ref().map(Username::as_str).unwrap_or("-")
    );

    let stream = BroadcastStream::new(rx).filter_map(move |result| match result {
        Ok(event) => {
            if !is_visible(&event, viewer.as_ref()) {
                return None;
            }
            Some(
                Event::default()
                    .event(event.name())
                    .json_data(&event)
                    .map_err(|e| {
                        tracing::error!("SSE serialization error: {}", e);
                        axum::Error::new(e)
                    }),
            )
        }
        Err(_lagged) => {
            tracing::warn!("SSE client lagged; some events were dropped");
            None
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(std::time::Duration::from_secs(15))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::Notification;

    fn user(name: &str) -> Username {
        Username::new(name).unwrap()
    }

    #[test]
    fn notifications_only_reach_their_target() {
        let event = FeedEvent::NotificationCreated {
            notification: Notification {
                id: 1,
                target_user: user("alice"),
                comment_id: 7,
                is_read: false,
            },
        };
        assert!(is_visible(&event, Some(&user("alice"))));
        assert!(!is_visible(&event, Some(&user("bob"))));
        assert!(!is_visible(&event, None));
    }

    #[test]
    fn feed_events_reach_everyone() {
        let event = FeedEvent::PostDeleted { post_id: 3 };
        assert!(is_visible(&event, None));
        assert!(is_visible(&event, Some(&user("bob"))));
    }
}
