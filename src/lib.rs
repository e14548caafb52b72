//! User-account backend: credential hashing, user persistence with an
//! all-or-nothing partial update, and a once-initialized Postgres pool.

pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod state;
pub mod users;

pub use config::{AppConfig, DbConfig};
pub use db::ConnectionManager;
pub use error::{AccountError, ConnectionError, HashingError, StoreError};
pub use state::AppState;
