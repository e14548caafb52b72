use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use tracing::warn;

use crate::error::AccountError;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Request body for sign-up, sign-in and administrative create.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

impl CredentialsRequest {
    /// Trims the email and rejects input the core should never see.
    pub(crate) fn validated(mut self) -> Result<Self, AccountError> {
        self.email = self.email.trim().to_string();

        if !is_valid_email(&self.email) {
            warn!(email = %self.email, "invalid email");
            return Err(AccountError::Validation("Invalid email".into()));
        }
        if self.password.is_empty() {
            warn!("empty password");
            return Err(AccountError::Validation("Password is required".into()));
        }
        Ok(self)
    }
}
