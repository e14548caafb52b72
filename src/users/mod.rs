use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

#[cfg(test)]
pub(crate) mod memory;

pub use repo::{PgUserRepository, UserStore};
pub use repo_types::{UpdateOutcome, User, UserPublicView, UserUpdate};
pub use services::UserService;

pub fn router() -> Router<AppState> {
    handlers::admin_routes()
}
