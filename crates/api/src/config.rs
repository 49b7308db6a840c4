//! Runtime configuration, read once from the environment at startup.

use std::net::SocketAddr;

use anyhow::Context;
use chrono::Duration;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 30;
const DEV_SESSION_SECRET: &str = "dev-secret";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Postgres connection string; `None` runs against the seeded in-memory store.
    pub database_url: Option<String>,
    pub session_secret: String,
    pub session_ttl: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR must be a socket address like 0.0.0.0:8080")?;

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if database_url.is_none() {
            tracing::warn!("DATABASE_URL not set; using in-memory store with demo data");
        }

        let session_secret = match lookup("SESSION_SECRET") {
            Some(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!("SESSION_SECRET not set; using insecure dev default");
                DEV_SESSION_SECRET.to_string()
            }
        };

        let ttl_hours = match lookup("SESSION_TTL_HOURS") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|h| *h > 0)
                .context("SESSION_TTL_HOURS must be a positive integer")?,
            None => DEFAULT_SESSION_TTL_HOURS,
        };

        Ok(Self {
            bind_addr,
            database_url,
            session_secret,
            session_ttl: Duration::hours(ttl_hours),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:8080");
        assert!(cfg.database_url.is_none());
        assert_eq!(cfg.session_secret, "dev-secret");
        assert_eq!(cfg.session_ttl, Duration::days(30));
    }

    #[test]
    fn values_are_read_from_the_source() {
        let cfg = config(&[
            ("BIND_ADDR", "127.0.0.1:3000"),
            ("DATABASE_URL", "postgres://localhost/invoices"),
            ("SESSION_SECRET", "s3cret"),
            ("SESSION_TTL_HOURS", "2"),
        ])
        .unwrap();
        assert_eq!(cfg.bind_addr.port(), 3000);
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/invoices"));
        assert_eq!(cfg.session_secret, "s3cret");
        assert_eq!(cfg.session_ttl, Duration::hours(2));
    }

    #[test]
    fn blank_database_url_means_in_memory() {
        let cfg = config(&[("DATABASE_URL", "  ")]).unwrap();
        assert!(cfg.database_url.is_none());
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(config(&[("BIND_ADDR", "nope")]).is_err());
        assert!(config(&[("SESSION_TTL_HOURS", "0")]).is_err());
        assert!(config(&[("SESSION_TTL_HOURS", "soon")]).is_err());
    }
}
