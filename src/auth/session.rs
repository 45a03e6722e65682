use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use tower_sessions::Session;
use tracing::{error, warn};
use uuid::Uuid;

use crate::state::AppState;
use crate::store::{Role, User};

/// Key the authenticated user's id is stored under in the session.
pub const SESSION_USER_ID_KEY: &str = "user_id";

/// Extracts the authenticated user from the request's session.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(status, msg)| (status, msg.to_string()))?;

        let user_id: Uuid = session
            .get(SESSION_USER_ID_KEY)
            .await
            .map_err(|e| {
                error!(error = %e, "session load failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong".to_string(),
                )
            })?
            .ok_or((
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
            ))?;

        let Some(user) = state.store.user(user_id).await else {
            warn!(%user_id, "session refers to a user that no longer exists");
            return Err((
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
            ));
        };

        Ok(CurrentUser(user))
    }
}

/// [`CurrentUser`] narrowed to the privileged role.
pub struct SuperAdmin(pub User);

#[async_trait]
impl FromRequestParts<AppState> for SuperAdmin {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if user.role != Role::SuperAdmin {
            warn!(user_id = %user.id, username = %user.username, "super admin route refused");
            return Err((
                StatusCode::FORBIDDEN,
                "Super admin access required".to_string(),
            ));
        }
        Ok(SuperAdmin(user))
    }
}
