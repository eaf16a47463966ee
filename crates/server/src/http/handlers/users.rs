use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::{presence::Roster, FeedEvent, ProfileUpdate, User};
use serde::Deserialize;
use tracing::info;

use crate::http::error::{internal, invalid, parse_username, ApiResult, AttachmentPayload};
use crate::render;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SaveProfileRequest {
    pub display_name: String,
    pub icon: Option<AttachmentPayload>,
}

pub async fn save_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(payload): Json<SaveProfileRequest>,
) -> ApiResult<Json<User>> {
    let username = parse_username(&username)?;
    let profile = ProfileUpdate::new(username, payload.display_name).map_err(invalid)?;

    let icon = match payload.icon {
        Some(icon) => {
            let upload = icon.decode()?;
            Some(
                state
                    .uploads
                    .save_icon(&profile.username, &upload)
                    .await
                    .map_err(internal)?,
            )
        }
        None => None,
    };

    let user = state
        .db
        .upsert_user(&profile, icon.as_deref())
        .await
        .map_err(internal)?;
    info!("Profile saved: {}", user.username);

    state.publish(FeedEvent::ProfileSaved {
        username: user.username.clone(),
        display_name: user.display_name.clone(),
    });
    Ok(Json(user))
}

pub async fn touch_activity(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<StatusCode> {
    let username = parse_username(&username)?;
    render::record_activity(&state, &username)
        .await
        .map_err(internal)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn roster(State(state): State<AppState>) -> ApiResult<Json<Roster>> {
    let roster = render::roster(&state).await.map_err(internal)?;
    tracing::debug!(
        "Roster: {}/{} online",
        roster.online_count(),
        roster.member_count
    );
    Ok(Json(roster))
}
