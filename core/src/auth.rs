//! OAuth2 client-credentials authentication.
//!
//! # Design
//! [`AuthenticatedTransport`] wraps any [`Transport`] and stamps each request
//! with a bearer token from a [`TokenSource`]. The default source,
//! [`ClientCredentials`], exchanges the client id and secret at the VTN's
//! token endpoint, caches the token, and fetches a new one once the cached
//! token is within [`EXPIRY_DELTA`] of expiring. The token request goes
//! through the same inner transport as the API calls.
//!
//! The cache is the only mutable state in the client. It sits behind a mutex
//! that is held across a refresh, so concurrent callers wait for one token
//! request instead of racing several.

use std::fmt;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Deserialize;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::http::{
    HttpMethod, HttpRequest, HttpResponse, ACCEPT, APPLICATION_JSON, AUTHORIZATION, CONTENT_TYPE,
    FORM_URLENCODED,
};
use crate::transport::Transport;

/// Tokens this close to expiry are treated as already expired.
pub const EXPIRY_DELTA: Duration = Duration::from_secs(10);

/// Supplies bearer tokens, fetching them through `transport` when needed.
pub trait TokenSource: Send + Sync {
    fn token(&self, transport: &dyn Transport) -> Result<String, TransportError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct CachedToken {
    access_token: String,
    /// `None` when the server did not say; such tokens never expire.
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn is_fresh(&self, now: Instant) -> bool {
        match self.expires_at {
            None => true,
            Some(at) => now + EXPIRY_DELTA < at,
        }
    }
}

/// Client-credentials grant against `{base_url}/auth/token`.
pub struct ClientCredentials {
    token_url: String,
    client_id: String,
    client_secret: String,
    scope: Option<String>,
    cache: Mutex<Option<CachedToken>>,
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl ClientCredentials {
    pub fn new(
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        scope: Option<String>,
    ) -> Self {
        Self {
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope,
            cache: Mutex::new(None),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            config.token_url(),
            config.client_id.clone(),
            config.client_secret.clone(),
            config.scope.clone(),
        )
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Forget the cached token; the next request fetches a new one.
    pub fn invalidate(&self) {
        *self.cache.lock() = None;
    }

    fn token_request(&self) -> HttpRequest {
        let mut form = url::form_urlencoded::Serializer::new(String::new());
        form.append_pair("grant_type", "client_credentials");
        form.append_pair("client_id", &self.client_id);
        form.append_pair("client_secret", &self.client_secret);
        if let Some(scope) = &self.scope {
            form.append_pair("scope", scope);
        }

        HttpRequest {
            method: HttpMethod::Post,
            url: self.token_url.clone(),
            headers: vec![
                (ACCEPT.to_string(), APPLICATION_JSON.to_string()),
                (CONTENT_TYPE.to_string(), FORM_URLENCODED.to_string()),
            ],
            body: Some(form.finish()),
        }
    }

    fn fetch(&self, transport: &dyn Transport) -> Result<CachedToken, TransportError> {
        let requested_at = Instant::now();
        let HttpResponse { status, body, .. } = transport.send(self.token_request())?;
        if !(200..300).contains(&status) {
            return Err(TransportError::Token { status, body });
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(TransportError::TokenDecode)?;
        let expires_at = token
            .expires_in
            .and_then(|secs| requested_at.checked_add(Duration::from_secs(secs)));
        debug!(expires_in = ?token.expires_in, "access token acquired");

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at,
        })
    }
}

impl TokenSource for ClientCredentials {
    fn token(&self, transport: &dyn Transport) -> Result<String, TransportError> {
        let mut cache = self.cache.lock();
        if let Some(cached) = cache.as_ref() {
            if cached.is_fresh(Instant::now()) {
                return Ok(cached.access_token.clone());
            }
            debug!(token_url = %self.token_url, "access token expired, refreshing");
        } else {
            debug!(token_url = %self.token_url, "requesting access token");
        }

        let fresh = self.fetch(transport)?;
        let token = fresh.access_token.clone();
        *cache = Some(fresh);
        Ok(token)
    }
}

/// A [`Transport`] that authorizes every request with a bearer token.
#[derive(Debug)]
pub struct AuthenticatedTransport<T, S = ClientCredentials> {
    inner: T,
    tokens: S,
}

impl<T: Transport, S: TokenSource> AuthenticatedTransport<T, S> {
    pub fn new(inner: T, tokens: S) -> Self {
        Self { inner, tokens }
    }

    pub fn tokens(&self) -> &S {
        &self.tokens
    }
}

impl<T: Transport, S: TokenSource> Transport for AuthenticatedTransport<T, S> {
    fn send(&self, mut request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let token = self.tokens.token(&self.inner)?;
        request
            .headers
            .retain(|(name, _)| !name.eq_ignore_ascii_case(AUTHORIZATION));
        request
            .headers
            .push((AUTHORIZATION.to_string(), format!("Bearer {token}")));
        self.inner.send(request)
    }
}
