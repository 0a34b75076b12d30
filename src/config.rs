use std::env;
use anyhow::{Context, Result};
use zeroize::{Zeroize, Zeroizing};

/// The application's configuration.
#[derive(Clone)]
pub struct Config {
    /// Base URL of the upstream REST API that owns all business data.
    pub upstream_api_url: String,
    /// Key used to sign and verify session tokens.
    pub session_secret: Zeroizing<Vec<u8>>,
    /// The duration of a session in days.
    pub session_duration_days: i64,
    /// TCP port the server binds to.
    pub port: u16,
    /// Directory of static admin UI assets.
    pub public_dir: String,
    /// Whether we are running in production (hardens cookies).
    pub production: bool,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let mut session_secret_hex = env::var("SESSION_SECRET")
            .context("SESSION_SECRET must be set (generate with: openssl rand -hex 32)")?;

        let session_secret_bytes = hex::decode(&session_secret_hex)
            .context("SESSION_SECRET must be valid hexadecimal")?;

        session_secret_hex.zeroize();

        if session_secret_bytes.len() < 32 {
            anyhow::bail!("SESSION_SECRET must be at least 32 bytes (64 hex characters)");
        }

        let upstream_api_url = env::var("UPSTREAM_API_URL")
            .context("UPSTREAM_API_URL must be set")?
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            upstream_api_url,
            session_secret: Zeroizing::new(session_secret_bytes),
            session_duration_days: env::var("SESSION_DURATION_DAYS")
                .unwrap_or_else(|_| "7".to_string())
                .parse()
                .context("Invalid SESSION_DURATION_DAYS")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("Invalid PORT")?,
            public_dir: env::var("PUBLIC_DIR").unwrap_or_else(|_| "public".to_string()),
            production: env::var("APP_ENV")
                .map(|v| v == "production")
                .unwrap_or(false),
        })
    }
}
