use crate::config::Config;
use crate::error::Result;
use crate::services::session::SessionKeys;
use crate::services::upstream::UpstreamClient;

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration.
    pub config: Config,
    /// Signing/verification keys for session tokens.
    pub sessions: SessionKeys,
    /// Client for the upstream REST API.
    pub upstream: UpstreamClient,
}

impl AppState {
    /// Creates a new `AppState`.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub fn new(config: &Config) -> Result<Self> {
        let sessions = SessionKeys::new(&config.session_secret, config.session_duration_days);
        tracing::info!("✅ Session keys initialized (HS256, stateless)");

        let upstream = UpstreamClient::new(&config.upstream_api_url)?;
        tracing::info!("✅ Upstream client initialized ({})", config.upstream_api_url);

        Ok(AppState {
            config: config.clone(),
            sessions,
            upstream,
        })
    }
}
