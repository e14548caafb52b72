use std::{str::FromStr, time::Duration};

use anyhow::Context;
use serde::Deserialize;

/// Connection settings for the backing Postgres store, plus pool tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    pub username: String,
    pub password: String,
    pub hostname: String,
    pub port: u16,
    pub database_name: String,
    pub max_open_connections: u32,
    pub max_idle_connections: u32,
    pub max_lifetime: Duration,
    pub acquire_timeout: Duration,
    pub connect_lazy: bool,
}

impl DbConfig {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        hostname: impl Into<String>,
        database_name: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            hostname: hostname.into(),
            port: 5432,
            database_name: database_name.into(),
            max_open_connections: 10,
            max_idle_connections: 5,
            max_lifetime: Duration::from_secs(5 * 60),
            acquire_timeout: Duration::from_secs(30),
            connect_lazy: false,
        }
    }

    fn validate(self) -> anyhow::Result<Self> {
        if self.max_open_connections == 0 {
            anyhow::bail!("DB_MAX_OPEN_CONNS must be at least 1");
        }
        if self.max_idle_connections > self.max_open_connections {
            anyhow::bail!(
                "DB_MAX_IDLE_CONNS ({}) exceeds DB_MAX_OPEN_CONNS ({})",
                self.max_idle_connections,
                self.max_open_connections
            );
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DbConfig,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let required = |key: &str| lookup(key).with_context(|| format!("{key} is not set"));
        let defaults = DbConfig::new(
            lookup("DB_USERNAME").unwrap_or_default(),
            lookup("DB_PASSWORD").unwrap_or_default(),
            required("DB_HOSTNAME")?,
            required("DB_NAME")?,
        );

        let database = DbConfig {
            port: parse_or(&lookup, "DB_PORT", defaults.port)?,
            max_open_connections: parse_or(
                &lookup,
                "DB_MAX_OPEN_CONNS",
                defaults.max_open_connections,
            )?,
            max_idle_connections: parse_or(
                &lookup,
                "DB_MAX_IDLE_CONNS",
                defaults.max_idle_connections,
            )?,
            max_lifetime: Duration::from_secs(parse_or(
                &lookup,
                "DB_CONN_MAX_LIFETIME_SECS",
                defaults.max_lifetime.as_secs(),
            )?),
            acquire_timeout: Duration::from_secs(parse_or(
                &lookup,
                "DB_ACQUIRE_TIMEOUT_SECS",
                defaults.acquire_timeout.as_secs(),
            )?),
            connect_lazy: parse_or(&lookup, "DB_CONNECT_LAZY", defaults.connect_lazy)?,
            ..defaults
        }
        .validate()?;

        Ok(Self {
            database,
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&lookup, "APP_PORT", 8080)?,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_required_keys_set() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("DB_HOSTNAME", "db.internal"),
            ("DB_NAME", "accounts"),
        ]))
        .expect("config should load");

        assert_eq!(cfg.database.hostname, "db.internal");
        assert_eq!(cfg.database.port, 5432);
        assert_eq!(cfg.database.max_open_connections, 10);
        assert_eq!(cfg.database.max_idle_connections, 5);
        assert_eq!(cfg.database.max_lifetime, Duration::from_secs(300));
        assert!(!cfg.database.connect_lazy);
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 8080);
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("DB_USERNAME", "svc"),
            ("DB_PASSWORD", "pw"),
            ("DB_HOSTNAME", "localhost"),
            ("DB_NAME", "accounts"),
            ("DB_PORT", "6543"),
            ("DB_MAX_OPEN_CONNS", "20"),
            ("DB_MAX_IDLE_CONNS", "2"),
            ("DB_CONN_MAX_LIFETIME_SECS", "60"),
            ("DB_CONNECT_LAZY", "true"),
            ("APP_PORT", "9000"),
        ]))
        .expect("config should load");

        assert_eq!(cfg.database.username, "svc");
        assert_eq!(cfg.database.port, 6543);
        assert_eq!(cfg.database.max_open_connections, 20);
        assert_eq!(cfg.database.max_idle_connections, 2);
        assert_eq!(cfg.database.max_lifetime, Duration::from_secs(60));
        assert!(cfg.database.connect_lazy);
        assert_eq!(cfg.port, 9000);
    }

    #[test]
    fn missing_hostname_is_an_error() {
        let err = AppConfig::from_lookup(lookup_from(&[("DB_NAME", "accounts")])).unwrap_err();
        assert!(err.to_string().contains("DB_HOSTNAME"));
    }

    #[test]
    fn unparseable_number_is_an_error() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("DB_HOSTNAME", "localhost"),
            ("DB_NAME", "accounts"),
            ("DB_MAX_OPEN_CONNS", "lots"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("DB_MAX_OPEN_CONNS"));
    }

    #[test]
    fn idle_above_open_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("DB_HOSTNAME", "localhost"),
            ("DB_NAME", "accounts"),
            ("DB_MAX_OPEN_CONNS", "3"),
            ("DB_MAX_IDLE_CONNS", "4"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("exceeds"));
    }
}
