use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use crate::store::Role;

/// Body for creating an admin account.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
}

/// Body for updating an admin account; absent fields stay unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

pub fn validate_username(raw: &str) -> Result<String, String> {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[a-z0-9][a-z0-9._-]{2,31}$").unwrap();
    }
    let username = raw.trim().to_lowercase();
    if !USERNAME_RE.is_match(&username) {
        return Err(
            "Username must be 3-32 characters: letters, digits, '.', '_' or '-'".to_string(),
        );
    }
    Ok(username)
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < 8 {
        return Err("Password too short".to_string());
    }
    Ok(())
}
