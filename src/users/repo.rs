use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, error};

use crate::error::StoreError;
use crate::users::repo_types::{
    FieldUpdate, UpdateOutcome, User, UserField, UserPublicView, UserUpdate,
};

/// Persistence seam for user records. All reads and writes of `users` go
/// through an implementation of this trait.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list_all(&self) -> Result<Vec<UserPublicView>, StoreError>;

    async fn get_by_email(&self, email: &str) -> Result<Option<UserPublicView>, StoreError>;

    /// Full record including the password hash, for credential checks only.
    async fn find_credentials(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn create(&self, email: &str, password_hash: &str) -> Result<(), StoreError>;

    async fn delete_by_email(&self, email: &str) -> Result<(), StoreError>;

    async fn delete_all(&self) -> Result<(), StoreError>;

    /// Applies every present field of `update` or none of them.
    async fn update_by_email(
        &self,
        current_email: &str,
        update: &UserUpdate,
    ) -> Result<UpdateOutcome, StoreError>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserRepository {
    async fn list_all(&self) -> Result<Vec<UserPublicView>, StoreError> {
        let users = sqlx::query_as::<_, UserPublicView>("SELECT email FROM users")
            .fetch_all(&self.db)
            .await
            .map_err(|e| {
                error!(error = %e, "error querying users");
                StoreError::Database(e)
            })?;
        Ok(users)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<UserPublicView>, StoreError> {
        let user = sqlx::query_as::<_, UserPublicView>(
            r#"
            SELECT email
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| {
            error!(error = %e, "error fetching user by email");
            StoreError::Database(e)
        })?;
        Ok(user)
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT email, password_hash
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| {
            error!(error = %e, "error fetching user credentials");
            StoreError::Database(e)
        })?;
        Ok(user)
    }

    async fn create(&self, email: &str, password_hash: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .execute(&self.db)
        .await
        .map_err(|e| {
            let err = StoreError::from_write(e, email);
            if let StoreError::Database(cause) = &err {
                error!(error = %cause, "error creating user");
            }
            err
        })?;
        Ok(())
    }

    async fn delete_by_email(&self, email: &str) -> Result<(), StoreError> {
        let done = sqlx::query("DELETE FROM users WHERE email = $1")
            .bind(email)
            .execute(&self.db)
            .await
            .map_err(|e| {
                error!(error = %e, "error deleting user by email");
                StoreError::Database(e)
            })?;
        debug!(rows = done.rows_affected(), "delete by email");
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        sqlx::query("TRUNCATE TABLE users")
            .execute(&self.db)
            .await
            .map_err(|e| {
                error!(error = %e, "error clearing users table");
                StoreError::Database(e)
            })?;
        Ok(())
    }

    async fn update_by_email(
        &self,
        current_email: &str,
        update: &UserUpdate,
    ) -> Result<UpdateOutcome, StoreError> {
        if update.is_empty() {
            debug!("update with no present fields; nothing to do");
            return Ok(UpdateOutcome::Applied);
        }

        let statements = update.statements();
        let mut tx = self.db.begin().await.map_err(|e| {
            error!(error = %e, "error beginning transaction");
            StoreError::Database(e)
        })?;

        // The row is addressed by its email, which the first statement may change.
        let mut row_email = current_email.to_string();

        for FieldUpdate { field, value } in statements {
            let result = sqlx::query(field.statement())
                .bind(value)
                .bind(&row_email)
                .execute(&mut *tx)
                .await;

            match result {
                Ok(done) if done.rows_affected() == 0 => {
                    debug!(?field, "no user matched; rolling back");
                    tx.rollback().await?;
                    return Ok(UpdateOutcome::NotApplied);
                }
                Ok(_) => {
                    if field == UserField::Email {
                        row_email = value.to_string();
                    }
                }
                Err(e) => {
                    error!(error = %e, ?field, "error updating user field");
                    if let Err(rollback_err) = tx.rollback().await {
                        error!(error = %rollback_err, "transaction rollback failed");
                    }
                    return Err(match field {
                        UserField::Email => StoreError::from_write(e, value),
                        UserField::PasswordHash => StoreError::Database(e),
                    });
                }
            }
        }

        tx.commit().await.map_err(|e| {
            error!(error = %e, "error committing transaction");
            StoreError::Database(e)
        })?;
        Ok(UpdateOutcome::Applied)
    }
}
