use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub email: String, // primary key
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string, never exposed in JSON
}

/// Outward-facing projection of a [`User`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserPublicView {
    pub email: String,
}

impl From<User> for UserPublicView {
    fn from(user: User) -> Self {
        Self { email: user.email }
    }
}

/// Column a partial update may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    Email,
    PasswordHash,
}

impl UserField {
    /// Single-column update keyed on the row's email.
    pub fn statement(self) -> &'static str {
        match self {
            UserField::Email => "UPDATE users SET email = $1 WHERE email = $2",
            UserField::PasswordHash => "UPDATE users SET password_hash = $1 WHERE email = $2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldUpdate<'a> {
    pub field: UserField,
    pub value: &'a str,
}

/// Repository-level partial update. `None` or an empty string leaves the
/// column as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl UserUpdate {
    /// Present fields in execution order: email first, then password hash.
    pub fn statements(&self) -> Vec<FieldUpdate<'_>> {
        [
            (UserField::Email, self.email.as_deref()),
            (UserField::PasswordHash, self.password_hash.as_deref()),
        ]
        .into_iter()
        .filter_map(|(field, value)| match value {
            Some(v) if !v.is_empty() => Some(FieldUpdate { field, value: v }),
            _ => None,
        })
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.statements().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied,
    /// No user matched the email the update was addressed to.
    NotApplied,
}
