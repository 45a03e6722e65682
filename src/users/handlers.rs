use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{validate_password, validate_username, CreateUserRequest, UpdateUserRequest};
use crate::auth::dto::PublicUser;
use crate::auth::password::hash_password;
use crate::auth::session::SuperAdmin;
use crate::state::AppState;
use crate::store::{User, UserUpdate};

/// The one account no other account may touch, not even a super admin.
pub const PROTECTED_USERNAME: &str = "admin";

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", put(update_user).delete(delete_user))
}

/// Rejects requests that target the protected account, or would rename
/// another account to it, unless the caller is that very account.
fn guard_protected_account(
    caller: &User,
    target_username: &str,
    new_username: Option<&str>,
) -> Result<(), (StatusCode, String)> {
    let touches_protected =
        target_username == PROTECTED_USERNAME || new_username == Some(PROTECTED_USERNAME);
    if touches_protected && caller.username != PROTECTED_USERNAME {
        warn!(
            caller = %caller.username,
            target = target_username,
            "protected account request refused"
        );
        return Err((
            StatusCode::FORBIDDEN,
            "The primary admin account can only be managed by itself".to_string(),
        ));
    }
    Ok(())
}

#[instrument(skip(state, _caller))]
pub async fn list_users(
    State(state): State<AppState>,
    SuperAdmin(_caller): SuperAdmin,
) -> Json<Vec<PublicUser>> {
    let users = state.store.list_users().await;
    Json(users.into_iter().map(PublicUser::from).collect())
}

#[instrument(skip(state, caller, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    SuperAdmin(caller): SuperAdmin,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<PublicUser>), (StatusCode, String)> {
    let username =
        validate_username(&payload.username).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;
    validate_password(&payload.password).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;
    guard_protected_account(&caller, &username, None)?;

    if state.store.user_by_username(&username).await.is_some() {
        return Err((StatusCode::CONFLICT, "Username already taken".into()));
    }

    let password_hash = hash_password(&payload.password).map_err(|e| {
        tracing::error!(error = %e, "hash_password failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Something went wrong".to_string(),
        )
    })?;

    let user = state
        .store
        .insert_user(User {
            id: Uuid::new_v4(),
            username,
            password_hash,
            role: payload.role,
            created_at: OffsetDateTime::now_utc(),
        })
        .await;

    info!(user_id = %user.id, username = %user.username, actor = %caller.username, "user created");
    Ok((StatusCode::CREATED, Json(PublicUser::from(user))))
}

#[instrument(skip(state, caller, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    SuperAdmin(caller): SuperAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    let target = state
        .store
        .user(id)
        .await
        .ok_or((StatusCode::NOT_FOUND, "User not found".to_string()))?;

    let username = match payload.username {
        Some(ref raw) => {
            let username =
                validate_username(raw).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;
            if let Some(existing) = state.store.user_by_username(&username).await {
                if existing.id != id {
                    return Err((StatusCode::CONFLICT, "Username already taken".into()));
                }
            }
            Some(username)
        }
        None => None,
    };

    guard_protected_account(&caller, &target.username, username.as_deref())?;

    let password_hash = match payload.password {
        Some(ref password) => {
            validate_password(password).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;
            Some(hash_password(password).map_err(|e| {
                tracing::error!(error = %e, "hash_password failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong".to_string(),
                )
            })?)
        }
        None => None,
    };

    let updated = state
        .store
        .update_user(
            id,
            UserUpdate {
                username,
                password_hash,
                role: payload.role,
            },
        )
        .await
        .ok_or((StatusCode::NOT_FOUND, "User not found".to_string()))?;

    info!(user_id = %id, actor = %caller.username, "user updated");
    Ok(Json(PublicUser::from(updated)))
}

#[instrument(skip(state, caller))]
pub async fn delete_user(
    State(state): State<AppState>,
    SuperAdmin(caller): SuperAdmin,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    let target = state
        .store
        .user(id)
        .await
        .ok_or((StatusCode::NOT_FOUND, "User not found".to_string()))?;

    guard_protected_account(&caller, &target.username, None)?;

    state.store.delete_user(id).await;
    info!(user_id = %id, username = %target.username, actor = %caller.username, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Role;

    fn user(username: &str, role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: "hash".to_string(),
            role,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn other_super_admins_cannot_touch_the_protected_account() {
        let caller = user("owner", Role::SuperAdmin);
        let err = guard_protected_account(&caller, PROTECTED_USERNAME, None).unwrap_err();
        assert_eq!(err.0, StatusCode::FORBIDDEN);
    }

    #[test]
    fn renaming_another_account_to_the_protected_name_is_refused() {
        let caller = user("owner", Role::SuperAdmin);
        let err =
            guard_protected_account(&caller, "clerk", Some(PROTECTED_USERNAME)).unwrap_err();
        assert_eq!(err.0, StatusCode::FORBIDDEN);
    }

    #[test]
    fn the_protected_account_may_manage_itself() {
        let caller = user(PROTECTED_USERNAME, Role::SuperAdmin);
        assert!(guard_protected_account(&caller, PROTECTED_USERNAME, None).is_ok());
    }

    #[test]
    fn unrelated_accounts_are_not_guarded() {
        let caller = user("owner", Role::SuperAdmin);
        assert!(guard_protected_account(&caller, "clerk", Some("clerk2")).is_ok());
    }
}
