use std::{collections::BTreeMap, sync::Mutex};

use async_trait::async_trait;

use crate::error::StoreError;
use crate::users::repo::UserStore;
use crate::users::repo_types::{UpdateOutcome, User, UserField, UserPublicView, UserUpdate};

/// In-process [`UserStore`] used by service and handler tests.
#[derive(Default)]
pub(crate) struct MemoryUserStore {
    rows: Mutex<BTreeMap<String, String>>,
}

impl MemoryUserStore {
    pub(crate) fn hash_of(&self, email: &str) -> Option<String> {
        self.rows.lock().unwrap().get(email).cloned()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn list_all(&self) -> Result<Vec<UserPublicView>, StoreError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .keys()
            .map(|email| UserPublicView { email: email.clone() })
            .collect())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<UserPublicView>, StoreError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.get_key_value(email).map(|(email, _)| UserPublicView {
            email: email.clone(),
        }))
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<User>, StoreError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.get_key_value(email).map(|(email, hash)| User {
            email: email.clone(),
            password_hash: hash.clone(),
        }))
    }

    async fn create(&self, email: &str, password_hash: &str) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(email) {
            return Err(StoreError::Conflict(email.to_string()));
        }
        rows.insert(email.to_string(), password_hash.to_string());
        Ok(())
    }

    async fn delete_by_email(&self, email: &str) -> Result<(), StoreError> {
        self.rows.lock().unwrap().remove(email);
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        self.rows.lock().unwrap().clear();
        Ok(())
    }

    async fn update_by_email(
        &self,
        current_email: &str,
        update: &UserUpdate,
    ) -> Result<UpdateOutcome, StoreError> {
        if update.is_empty() {
            return Ok(UpdateOutcome::Applied);
        }

        let statements = update.statements();
        let mut rows = self.rows.lock().unwrap();
        let mut staged = rows.clone();
        let mut row_email = current_email.to_string();

        for step in statements {
            let Some(hash) = staged.remove(&row_email) else {
                return Ok(UpdateOutcome::NotApplied);
            };
            match step.field {
                UserField::Email => {
                    if staged.contains_key(step.value) {
                        return Err(StoreError::Conflict(step.value.to_string()));
                    }
                    row_email = step.value.to_string();
                    staged.insert(row_email.clone(), hash);
                }
                UserField::PasswordHash => {
                    staged.insert(row_email.clone(), step.value.to_string());
                }
            }
        }

        *rows = staged;
        Ok(UpdateOutcome::Applied)
    }
}
