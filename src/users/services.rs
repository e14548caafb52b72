use std::sync::Arc;

use tracing::{debug, info};

use crate::auth::password::hash_password;
use crate::error::{AccountError, AccountResult};
use crate::users::dto::UpdateRequest;
use crate::users::repo::UserStore;
use crate::users::repo_types::{UpdateOutcome, UserPublicView, UserUpdate};

/// Administrative user management on top of a [`UserStore`].
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn list_users(&self) -> AccountResult<Vec<UserPublicView>> {
        Ok(self.store.list_all().await?)
    }

    /// `None` when no user has `email`; that is a normal result here.
    pub async fn get_user(&self, email: &str) -> AccountResult<Option<UserPublicView>> {
        Ok(self.store.get_by_email(email).await?)
    }

    pub async fn create_user(&self, email: &str, password: &str) -> AccountResult<()> {
        let hash = hash_password(password)?;
        self.store.create(email, &hash).await?;
        info!(email = %email, "user created");
        Ok(())
    }

    pub async fn update_user(&self, current_email: &str, request: UpdateRequest) -> AccountResult<()> {
        let password_hash = match request.password.as_deref().filter(|p| !p.is_empty()) {
            Some(plain) => Some(hash_password(plain)?),
            None => None,
        };
        let update = UserUpdate {
            email: request.email.filter(|e| !e.is_empty()),
            password_hash,
        };

        match self.store.update_by_email(current_email, &update).await? {
            UpdateOutcome::Applied => {
                debug!(
                    email = %current_email,
                    email_changed = update.email.is_some(),
                    password_changed = update.password_hash.is_some(),
                    "user updated"
                );
                Ok(())
            }
            UpdateOutcome::NotApplied => Err(AccountError::NotFound),
        }
    }

    pub async fn delete_user(&self, email: &str) -> AccountResult<()> {
        self.store.delete_by_email(email).await?;
        Ok(())
    }

    pub async fn delete_all_users(&self) -> AccountResult<()> {
        self.store.delete_all().await?;
        info!("users table cleared");
        Ok(())
    }
}
