use std::sync::Arc;

use tracing::{debug, warn};

use crate::auth::password::{hash_password, verify_password};
use crate::error::{AccountError, AccountResult};
use crate::users::{UserPublicView, UserStore};

/// Sign-up and sign-in: credential hashing composed with the user store.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn UserStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> AccountResult<UserPublicView> {
        let hash = hash_password(password)?;
        self.store.create(email, &hash).await.map_err(|e| {
            warn!(email = %email, error = %e, "sign-up rejected");
            AccountError::from(e)
        })?;
        Ok(UserPublicView {
            email: email.to_string(),
        })
    }

    /// An unknown email is reported exactly like a wrong password.
    pub async fn sign_in(&self, email: &str, password: &str) -> AccountResult<UserPublicView> {
        let user = match self.store.find_credentials(email).await? {
            Some(user) => user,
            None => {
                warn!(email = %email, "sign-in for unknown email");
                return Err(AccountError::InvalidCredentials);
            }
        };

        if !verify_password(password, &user.password_hash) {
            warn!(email = %email, "sign-in with invalid password");
            return Err(AccountError::InvalidCredentials);
        }

        debug!(email = %email, "credentials verified");
        Ok(user.into())
    }
}
