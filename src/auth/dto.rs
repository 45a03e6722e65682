use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{Role, User};

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Public part of an account returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn test_public_user_serialization() {
        let user = User {
            id: Uuid::new_v4(),
            username: "owner".to_string(),
            password_hash: "hash".to_string(),
            role: Role::SuperAdmin,
            created_at: OffsetDateTime::now_utc(),
        };

        let json = serde_json::to_string(&PublicUser::from(user)).unwrap();
        assert!(json.contains("owner"));
        assert!(json.contains("super_admin"));
        assert!(!json.contains("hash"));
    }
}
