//! Static verifier configuration.

use crate::error::ConfigError;
use jsonwebtoken::Algorithm;
use std::time::Duration;

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Expected issuer, audience, and key set location for incoming tokens.
///
/// ```rust,ignore
/// use drinks_auth::AuthConfig;
///
/// let config = AuthConfig::for_tenant("coffee.eu.auth0.com", "drinks")
///     .leeway(30)
///     .min_refresh_interval(std::time::Duration::from_secs(60));
/// config.validate()?;
/// ```
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub issuer: String,
    pub audience: String,
    pub jwks_url: String,
    /// The only signing algorithm accepted in token headers.
    pub algorithm: Algorithm,
    /// Clock skew tolerated on `exp`, in seconds.
    pub leeway: u64,
    /// Upper bound on a single key set fetch.
    pub fetch_timeout: Duration,
    /// Refetch the key set once it is older than this.
    pub max_key_age: Option<Duration>,
    /// Do not refetch on an unknown `kid` more often than this.
    pub min_refresh_interval: Duration,
}

impl AuthConfig {
    pub fn new(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        jwks_url: impl Into<String>,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            jwks_url: jwks_url.into(),
            algorithm: Algorithm::RS256,
            leeway: 0,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            max_key_age: None,
            min_refresh_interval: Duration::ZERO,
        }
    }

    /// Configuration for a hosted identity tenant: issuer `https://<domain>/`
    /// with its key set at `/.well-known/jwks.json`.
    pub fn for_tenant(domain: &str, audience: impl Into<String>) -> Self {
        let domain = domain.trim_end_matches('/');
        Self::new(
            format!("https://{domain}/"),
            audience,
            format!("https://{domain}/.well-known/jwks.json"),
        )
    }

    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn leeway(mut self, seconds: u64) -> Self {
        self.leeway = seconds;
        self
    }

    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn max_key_age(mut self, age: Duration) -> Self {
        self.max_key_age = Some(age);
        self
    }

    pub fn min_refresh_interval(mut self, interval: Duration) -> Self {
        self.min_refresh_interval = interval;
        self
    }

    /// Reject configurations the verifier cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.issuer.trim().is_empty() {
            return Err(ConfigError::Missing("issuer"));
        }
        if self.audience.trim().is_empty() {
            return Err(ConfigError::Missing("audience"));
        }
        if self.jwks_url.trim().is_empty() {
            return Err(ConfigError::Missing("jwks_url"));
        }
        if !(self.jwks_url.starts_with("https://") || self.jwks_url.starts_with("http://")) {
            return Err(ConfigError::Invalid(format!(
                "jwks_url must be an http(s) URL: {}",
                self.jwks_url
            )));
        }
        // Published key sets only carry public keys.
        if matches!(
            self.algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(ConfigError::Invalid(format!(
                "algorithm {:?} is symmetric",
                self.algorithm
            )));
        }
        if self.fetch_timeout.is_zero() {
            return Err(ConfigError::Invalid("fetch_timeout must be positive".into()));
        }
        Ok(())
    }
}
