use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Duration;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "secret",
];

/// Ten years. Anything longer is a misconfiguration.
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365 * 10;

pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub static_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = get("SMARTLINKS_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("SMARTLINKS_JWT_SECRET is unset or still a placeholder");
        }

        let port = get("SMARTLINKS_PORT")
            .unwrap_or_else(|| "4000".into())
            .parse()
            .context("SMARTLINKS_PORT must be a port number")?;

        let token_ttl_hours: i64 = get("SMARTLINKS_TOKEN_TTL_HOURS")
            .unwrap_or_else(|| "24".into())
            .parse()
            .context("SMARTLINKS_TOKEN_TTL_HOURS must be a whole number of hours")?;
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&token_ttl_hours) {
            bail!(
                "SMARTLINKS_TOKEN_TTL_HOURS must be between 1 and {}",
                MAX_TOKEN_TTL_HOURS
            );
        }

        Ok(Self {
            host: get("SMARTLINKS_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            db_path: get("SMARTLINKS_DB_PATH")
                .unwrap_or_else(|| "smartlinks.db".into())
                .into(),
            jwt_secret,
            token_ttl: Duration::hours(token_ttl_hours),
            static_dir: get("SMARTLINKS_STATIC_DIR")
                .unwrap_or_else(|| "./static".into())
                .into(),
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}
