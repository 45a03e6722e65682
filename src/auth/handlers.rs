use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tower_sessions::Session;
use tracing::{error, info, instrument};

use crate::auth::dto::{LoginRequest, PublicUser};
use crate::auth::service::{authenticate, AuthError};
use crate::auth::session::{CurrentUser, SESSION_USER_ID_KEY};
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

#[instrument(skip(state, session, payload))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    payload.username = payload.username.trim().to_lowercase();
    if payload.username.is_empty() || payload.password.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Username and password are required".into(),
        ));
    }

    let now = OffsetDateTime::now_utc();
    let user = match authenticate(&state, &payload.username, &payload.password, now).await {
        Ok(user) => user,
        Err(AuthError::Locked) => {
            return Err((
                StatusCode::TOO_MANY_REQUESTS,
                "Too many failed login attempts. Try again later.".into(),
            ))
        }
        Err(AuthError::InvalidCredentials) => {
            return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()))
        }
        Err(AuthError::Internal(e)) => {
            error!(error = %e, "login failed");
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong".into(),
            ));
        }
    };

    // New session id for the authenticated identity.
    session.cycle_id().await.map_err(internal)?;
    session
        .insert(SESSION_USER_ID_KEY, user.id)
        .await
        .map_err(internal)?;

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(Json(PublicUser::from(user)))
}

#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<StatusCode, (StatusCode, String)> {
    session.flush().await.map_err(internal)?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip_all)]
pub async fn me(CurrentUser(user): CurrentUser) -> Json<PublicUser> {
    Json(PublicUser::from(user))
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    error!(error = %e, "session operation failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Something went wrong".to_string(),
    )
}
