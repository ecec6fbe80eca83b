//! Client configuration.

use std::fmt;
use std::time::Duration;

use crate::error::{ClientError, Result};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for one VTN.
#[derive(Clone)]
pub struct ClientConfig {
    /// VTN base URL without a trailing slash.
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub scope: Option<String>,
    /// Bound on each HTTP exchange, token requests included.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Rejects blank values and strips one trailing slash from `base_url`.
    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self> {
        let base_url = base_url.into();
        let client_id = client_id.into();
        let client_secret = client_secret.into();

        if base_url.trim().is_empty() {
            return Err(ClientError::config("base_url cannot be empty"));
        }
        if client_id.trim().is_empty() {
            return Err(ClientError::config("client_id cannot be empty"));
        }
        if client_secret.trim().is_empty() {
            return Err(ClientError::config("client_secret cannot be empty"));
        }

        Ok(Self {
            base_url: normalize_base_url(&base_url),
            client_id,
            client_secret,
            scope: None,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Build from `OADR3_BASE_URL`, `OADR3_CLIENT_ID`, `OADR3_CLIENT_SECRET`,
    /// and the optional `OADR3_SCOPE` and `OADR3_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| {
            std::env::var(name).map_err(|_| ClientError::config(format!("{name} is not set")))
        };

        let mut config = Self::new(
            var("OADR3_BASE_URL")?,
            var("OADR3_CLIENT_ID")?,
            var("OADR3_CLIENT_SECRET")?,
        )?;

        if let Ok(scope) = std::env::var("OADR3_SCOPE") {
            if !scope.trim().is_empty() {
                config.scope = Some(scope);
            }
        }
        if let Ok(raw) = std::env::var("OADR3_TIMEOUT_SECS") {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| ClientError::config(format!("OADR3_TIMEOUT_SECS is not a number: {raw}")))?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    pub fn with_scope<S: Into<String>>(mut self, scope: S) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The client-credentials token endpoint.
    pub fn token_url(&self) -> String {
        format!("{}/auth/token", normalize_base_url(&self.base_url))
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("scope", &self.scope)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Strip exactly one trailing slash.
pub(crate) fn normalize_base_url(base_url: &str) -> String {
    base_url.strip_suffix('/').unwrap_or(base_url).to_string()
}
