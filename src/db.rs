use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::{config::DbConfig, error::ConnectionError};

/// Owns the process-wide Postgres pool.
///
/// The pool is opened on the first [`connect`](Self::connect) call and every
/// later call hands out a clone of the same handle. Concurrent first callers
/// wait on the single setup attempt and all see its outcome. A failed setup
/// is kept and returned forever; there is no retry.
#[derive(Default)]
pub struct ConnectionManager {
    pool: OnceCell<Result<PgPool, ConnectionError>>,
    attempts: AtomicUsize,
    closed: AtomicBool,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn connect(&self, config: &DbConfig) -> Result<PgPool, ConnectionError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(ConnectionError::Closed);
        }

        self.pool
            .get_or_init(|| async {
                self.attempts.fetch_add(1, Ordering::SeqCst);
                open_pool(config).await
            })
            .await
            .clone()
    }

    /// Number of pool setups performed so far (never more than one).
    pub fn init_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Closes the pool if it was ever opened. Safe to call more than once.
    ///
    /// A setup already in flight is awaited first, so the pool it produces
    /// is closed here rather than left open behind the `Closed` state.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let stored = self
            .pool
            .get_or_init(|| async { Err(ConnectionError::Closed) })
            .await;
        if let Ok(pool) = stored {
            pool.close().await;
            info!("database pool closed");
        }
    }
}

fn pool_options(config: &DbConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_open_connections)
        .min_connections(config.max_idle_connections)
        .max_lifetime(config.max_lifetime)
        .acquire_timeout(config.acquire_timeout)
}

fn connect_options(config: &DbConfig) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&config.hostname)
        .port(config.port)
        .username(&config.username)
        .password(&config.password)
        .database(&config.database_name)
}

async fn open_pool(config: &DbConfig) -> Result<PgPool, ConnectionError> {
    let options = pool_options(config);
    let target = connect_options(config);

    let pool = if config.connect_lazy {
        options.connect_lazy_with(target)
    } else {
        options.connect_with(target).await.map_err(|e| {
            error!(
                error = %e,
                host = %config.hostname,
                database = %config.database_name,
                "unable to connect to the database"
            );
            ConnectionError::Init(Arc::new(e))
        })?
    };

    info!(
        host = %config.hostname,
        database = %config.database_name,
        max_open = config.max_open_connections,
        max_idle = config.max_idle_connections,
        lazy = config.connect_lazy,
        "database pool ready"
    );
    Ok(pool)
}
