use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

/// Body of the public contact form.
#[derive(Debug, Deserialize)]
pub struct CreateContactRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

impl CreateContactRequest {
    /// Trims the fields and checks them, returning a human-readable message
    /// on the first violation.
    pub fn validate(mut self) -> Result<Self, String> {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_lowercase();
        self.message = self.message.trim().to_string();
        self.phone = self
            .phone
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        if self.name.is_empty() {
            return Err("Name is required".to_string());
        }
        if !is_valid_email(&self.email) {
            return Err("Invalid email".to_string());
        }
        if self.message.is_empty() {
            return Err("Message is required".to_string());
        }
        if self.message.len() > 2000 {
            return Err("Message must be at most 2000 characters".to_string());
        }
        Ok(self)
    }
}
