use thiserror::Error;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::auth::password::verify_password;
use crate::state::AppState;
use crate::store::User;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("too many failed login attempts")]
    Locked,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Runs one login attempt against the store and the lockout tracker.
///
/// The lockout check comes first: a locked username is refused even with a
/// correct password. Unknown usernames count as failures too, keyed by
/// whatever was submitted.
pub async fn authenticate(
    state: &AppState,
    username: &str,
    password: &str,
    now: OffsetDateTime,
) -> Result<User, AuthError> {
    if state.lockouts.locked_until(username, now).await.is_some() {
        warn!(username, "login attempt while locked out");
        return Err(AuthError::Locked);
    }

    let Some(user) = state.store.user_by_username(username).await else {
        let failures = state.lockouts.record_failure(username, now).await;
        warn!(username, failures, "login with unknown username");
        return Err(AuthError::InvalidCredentials);
    };

    if !verify_password(password, &user.password_hash)? {
        let failures = state.lockouts.record_failure(username, now).await;
        warn!(username, failures, "login with wrong password");
        return Err(AuthError::InvalidCredentials);
    }

    state.lockouts.reset(username).await;
    info!(user_id = %user.id, username, "login succeeded");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::lockout::LOCKOUT_MINUTES;
    use crate::auth::password::hash_password;
    use crate::store::Role;
    use time::Duration;
    use uuid::Uuid;

    const PASSWORD: &str = "counter-top-9";

    async fn seeded_state() -> AppState {
        let state = AppState::fake();
        state
            .store
            .insert_user(User {
                id: Uuid::new_v4(),
                username: "clerk".to_string(),
                password_hash: hash_password(PASSWORD).unwrap(),
                role: Role::Admin,
                created_at: OffsetDateTime::now_utc(),
            })
            .await;
        state
    }

    #[tokio::test]
    async fn correct_credentials_succeed() {
        let state = seeded_state().await;
        let now = OffsetDateTime::now_utc();
        let user = authenticate(&state, "clerk", PASSWORD, now).await.unwrap();
        assert_eq!(user.username, "clerk");
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let state = seeded_state().await;
        let now = OffsetDateTime::now_utc();
        let err = authenticate(&state, "clerk", "wrong", now).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn sixth_attempt_is_locked_even_with_correct_password() {
        let state = seeded_state().await;
        let now = OffsetDateTime::now_utc();
        for _ in 0..5 {
            let err = authenticate(&state, "clerk", "wrong", now).await.unwrap_err();
            assert!(matches!(err, AuthError::InvalidCredentials));
        }
        let err = authenticate(&state, "clerk", PASSWORD, now).await.unwrap_err();
        assert!(matches!(err, AuthError::Locked));
    }

    #[tokio::test]
    async fn login_succeeds_after_lockout_window_elapses() {
        let state = seeded_state().await;
        let now = OffsetDateTime::now_utc();
        for _ in 0..5 {
            authenticate(&state, "clerk", "wrong", now).await.unwrap_err();
        }

        let later = now + Duration::minutes(LOCKOUT_MINUTES + 1);
        let user = authenticate(&state, "clerk", PASSWORD, later).await.unwrap();
        assert_eq!(user.username, "clerk");

        // The streak was cleared; one new failure must not lock again.
        authenticate(&state, "clerk", "wrong", later).await.unwrap_err();
        assert!(state.lockouts.locked_until("clerk", later).await.is_none());
    }

    #[tokio::test]
    async fn success_resets_the_failure_counter() {
        let state = seeded_state().await;
        let now = OffsetDateTime::now_utc();
        for _ in 0..4 {
            authenticate(&state, "clerk", "wrong", now).await.unwrap_err();
        }
        authenticate(&state, "clerk", PASSWORD, now).await.unwrap();

        for _ in 0..4 {
            authenticate(&state, "clerk", "wrong", now).await.unwrap_err();
        }
        // Only four failures since the successful login: not locked yet.
        let user = authenticate(&state, "clerk", PASSWORD, now).await.unwrap();
        assert_eq!(user.username, "clerk");
    }

    #[tokio::test]
    async fn unknown_usernames_accumulate_failures() {
        let state = seeded_state().await;
        let now = OffsetDateTime::now_utc();
        for _ in 0..5 {
            let err = authenticate(&state, "ghost", "whatever", now).await.unwrap_err();
            assert!(matches!(err, AuthError::InvalidCredentials));
        }
        let err = authenticate(&state, "ghost", "whatever", now).await.unwrap_err();
        assert!(matches!(err, AuthError::Locked));
    }
}
