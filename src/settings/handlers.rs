use std::collections::HashMap;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};

use crate::auth::session::CurrentUser;
use crate::state::AppState;

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/settings", get(get_settings))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/settings", put(update_settings))
}

#[instrument(skip(state))]
pub async fn get_settings(State(state): State<AppState>) -> Json<HashMap<String, String>> {
    Json(state.store.settings().await)
}

/// Merge-upsert: keys in the body overwrite, everything else is kept.
#[instrument(skip(state, user, payload))]
pub async fn update_settings(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<HashMap<String, String>>,
) -> Result<Json<HashMap<String, String>>, (StatusCode, String)> {
    if payload.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "No settings provided".into()));
    }
    for key in payload.keys() {
        if key.trim().is_empty() {
            return Err((StatusCode::BAD_REQUEST, "Setting keys must not be empty".into()));
        }
        if key.len() > 64 {
            return Err((
                StatusCode::BAD_REQUEST,
                format!("Setting key too long: {key}"),
            ));
        }
    }

    let merged = state.store.merge_settings(payload).await;
    info!(count = merged.len(), actor = %user.username, "settings updated");
    Ok(Json(merged))
}
