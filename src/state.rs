use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::auth::AccountService;
use crate::users::{PgUserRepository, UserService, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub users: UserService,
}

impl AppState {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self {
            accounts: AccountService::new(store.clone()),
            users: UserService::new(store),
        }
    }

    /// State backed by the Postgres pool handed out by the connection manager.
    pub fn from_pool(db: PgPool) -> Self {
        Self::new(Arc::new(PgUserRepository::new(db)))
    }

    #[cfg(test)]
    pub(crate) fn fake() -> Self {
        Self::new(Arc::new(crate::users::memory::MemoryUserStore::default()))
    }
}

impl FromRef<AppState> for AccountService {
    fn from_ref(state: &AppState) -> Self {
        state.accounts.clone()
    }
}

impl FromRef<AppState> for UserService {
    fn from_ref(state: &AppState) -> Self {
        state.users.clone()
    }
}
