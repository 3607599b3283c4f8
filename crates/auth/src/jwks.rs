//! Signing key resolution against a JSON Web Key Set.
//!
//! [`KeyResolver`] fetches the issuer's key set on first use and serves
//! later lookups from an immutable snapshot. A refresh builds a complete new
//! snapshot and swaps it in, so concurrent readers see either the old set or
//! the new one, never a mix.
//!
//! ```rust,ignore
//! use drinks_auth::{AuthConfig, KeyResolver};
//!
//! let config = AuthConfig::for_tenant("coffee.auth0.com", "drinks");
//! let resolver = KeyResolver::from_config(&config)?;
//! let key = resolver.resolve("key-id-from-token-header").await?;
//! ```

use crate::{config::AuthConfig, error::KeyError};
use futures::future::BoxFuture;
use jsonwebtoken::{
    DecodingKey,
    jwk::{Jwk, JwkSet, PublicKeyUse},
};
use serde::Deserialize;
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Where a [`KeyResolver`] obtains the key set from.
pub trait KeySource: Send + Sync + 'static {
    /// Fetch the current key set.
    fn fetch(&self) -> BoxFuture<'_, Result<JwkSet, KeyError>>;
}

/// Key set published at an HTTP(S) endpoint.
pub struct HttpKeySource {
    client: reqwest::Client,
    url: String,
}

impl HttpKeySource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, KeyError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| KeyError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    async fn get(&self) -> Result<JwkSet, KeyError> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(request_error)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(KeyError::Status(status.as_u16()));
        }

        let body = resp.bytes().await.map_err(request_error)?;
        parse_key_set(&body)
    }
}

impl KeySource for HttpKeySource {
    fn fetch(&self) -> BoxFuture<'_, Result<JwkSet, KeyError>> {
        Box::pin(self.get())
    }
}

fn request_error(err: reqwest::Error) -> KeyError {
    if err.is_timeout() {
        KeyError::Timeout
    } else {
        KeyError::Transport(err.to_string())
    }
}

/// Outer shape of a key set document; entries are parsed one at a time.
#[derive(Deserialize)]
struct RawKeySet {
    keys: Vec<serde_json::Value>,
}

/// Parse a JSON Web Key Set document.
///
/// Only a document without a `keys` array is an error. Entries this crate
/// cannot model (unsupported `alg`, curve or key type) are skipped with a
/// warning so that the remaining keys stay usable.
pub fn parse_key_set(document: &[u8]) -> Result<JwkSet, KeyError> {
    let raw: RawKeySet =
        serde_json::from_slice(document).map_err(|e| KeyError::Document(e.to_string()))?;

    let mut keys = Vec::with_capacity(raw.keys.len());
    for entry in raw.keys {
        let kid = entry.get("kid").and_then(|kid| kid.as_str()).map(str::to_owned);
        match serde_json::from_value::<Jwk>(entry) {
            Ok(jwk) => keys.push(jwk),
            Err(e) => warn!(kid = kid.as_deref(), error = %e, "skipping unsupported key"),
        }
    }
    Ok(JwkSet { keys })
}

/// A fixed key set, for offline verification.
pub struct StaticKeySource {
    keys: JwkSet,
}

impl StaticKeySource {
    pub fn new(keys: JwkSet) -> Self {
        Self { keys }
    }

    pub fn from_json(document: &str) -> Result<Self, KeyError> {
        parse_key_set(document.as_bytes()).map(Self::new)
    }
}

impl KeySource for StaticKeySource {
    fn fetch(&self) -> BoxFuture<'_, Result<JwkSet, KeyError>> {
        Box::pin(futures::future::ready(Ok(self.keys.clone())))
    }
}

/// Decoding keys by `kid`, as of one fetch.
struct KeySnapshot {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Instant,
}

impl KeySnapshot {
    fn from_set(set: JwkSet) -> Self {
        let mut keys = HashMap::with_capacity(set.keys.len());
        for jwk in &set.keys {
            let Some(kid) = jwk.common.key_id.as_deref() else {
                warn!("skipping signing key without kid");
                continue;
            };
            if matches!(jwk.common.public_key_use, Some(PublicKeyUse::Encryption)) {
                debug!(kid, "skipping encryption key");
                continue;
            }
            match DecodingKey::from_jwk(jwk) {
                Ok(key) => {
                    keys.insert(kid.to_string(), key);
                }
                Err(e) => warn!(kid, error = %e, "skipping unusable signing key"),
            }
        }
        Self {
            keys,
            fetched_at: Instant::now(),
        }
    }
}

/// Cached, refreshable view of the issuer's signing keys.
pub struct KeyResolver {
    source: Arc<dyn KeySource>,
    fetch_timeout: Duration,
    max_age: Option<Duration>,
    min_refresh_interval: Duration,
    snapshot: RwLock<Option<Arc<KeySnapshot>>>,
    refreshing: Mutex<()>,
}

impl KeyResolver {
    pub fn new(source: impl KeySource) -> Self {
        Self {
            source: Arc::new(source),
            fetch_timeout: Duration::from_secs(5),
            max_age: None,
            min_refresh_interval: Duration::ZERO,
            snapshot: RwLock::new(None),
            refreshing: Mutex::new(()),
        }
    }

    /// Resolver over `source` with the refresh policy from `config`.
    pub fn with_config(source: impl KeySource, config: &AuthConfig) -> Self {
        let mut resolver = Self::new(source).fetch_timeout(config.fetch_timeout);
        resolver.max_age = config.max_key_age;
        resolver.min_refresh_interval = config.min_refresh_interval;
        resolver
    }

    /// Resolver fetching from `config.jwks_url`.
    pub fn from_config(config: &AuthConfig) -> Result<Self, KeyError> {
        let source = HttpKeySource::new(&config.jwks_url, config.fetch_timeout)?;
        Ok(Self::with_config(source, config))
    }

    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn max_age(mut self, age: Duration) -> Self {
        self.max_age = Some(age);
        self
    }

    pub fn min_refresh_interval(mut self, interval: Duration) -> Self {
        self.min_refresh_interval = interval;
        self
    }

    /// Return the decoding key for `kid`.
    ///
    /// The key set is fetched on first use. An unknown `kid` triggers one
    /// refetch to pick up rotated keys, unless the last fetch is more recent
    /// than the minimum refresh interval.
    pub async fn resolve(&self, kid: &str) -> Result<DecodingKey, KeyError> {
        let seen = self.current().await;
        if let Some(snapshot) = seen.as_ref().filter(|s| !self.is_stale(s)) {
            if let Some(key) = snapshot.keys.get(kid) {
                return Ok(key.clone());
            }
            debug!(kid, "kid not in cached key set");
        }

        let snapshot = self.refresh_after(seen.as_ref()).await?;
        snapshot
            .keys
            .get(kid)
            .cloned()
            .ok_or_else(|| KeyError::UnknownKey(kid.to_string()))
    }

    /// Fetch the key set now, replacing the cached one.
    pub async fn refresh(&self) -> Result<(), KeyError> {
        let _guard = self.refreshing.lock().await;
        self.fetch().await.map(|_| ())
    }

    /// Key ids in the cached set, sorted. Empty before the first fetch.
    pub async fn key_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = match self.current().await {
            Some(snapshot) => snapshot.keys.keys().cloned().collect(),
            None => Vec::new(),
        };
        ids.sort();
        ids
    }

    async fn current(&self) -> Option<Arc<KeySnapshot>> {
        self.snapshot.read().await.clone()
    }

    fn is_stale(&self, snapshot: &KeySnapshot) -> bool {
        self.max_age.is_some_and(|age| snapshot.fetched_at.elapsed() >= age)
    }

    /// Refresh unless another task already replaced `seen` while this one
    /// waited, or `seen` is too recent to refetch.
    async fn refresh_after(
        &self,
        seen: Option<&Arc<KeySnapshot>>,
    ) -> Result<Arc<KeySnapshot>, KeyError> {
        let _guard = self.refreshing.lock().await;

        if let Some(latest) = self.current().await.filter(|s| !self.is_stale(s)) {
            let replaced = seen.is_none_or(|seen| !Arc::ptr_eq(seen, &latest));
            if replaced {
                return Ok(latest);
            }
            if latest.fetched_at.elapsed() < self.min_refresh_interval {
                debug!("key set refreshed too recently, not refetching");
                return Ok(latest);
            }
        }

        self.fetch().await
    }

    async fn fetch(&self) -> Result<Arc<KeySnapshot>, KeyError> {
        debug!(timeout = ?self.fetch_timeout, "fetching signing keys");
        let set = match tokio::time::timeout(self.fetch_timeout, self.source.fetch()).await {
            Ok(Ok(set)) => set,
            Ok(Err(e)) => {
                warn!(error = %e, "signing key fetch failed");
                return Err(e);
            }
            Err(_) => {
                warn!("signing key fetch timed out");
                return Err(KeyError::Timeout);
            }
        };

        let snapshot = Arc::new(KeySnapshot::from_set(set));
        info!(keys = snapshot.keys.len(), "signing keys refreshed");
        *self.snapshot.write().await = Some(snapshot.clone());
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::KeyError;
    use crate::jwks::{KeyResolver, StaticKeySource, parse_key_set};
    use crate::test_support::{CountingSource, jwks_a, jwks_ab};
    use std::time::Duration;

    #[tokio::test]
    async fn fetches_once_then_reuses() {
        let source = CountingSource::always(jwks_a());
        let calls = source.calls();
        let resolver = KeyResolver::new(source);

        assert!(resolver.key_ids().await.is_empty());
        resolver.resolve("key-a").await.expect("first resolve");
        resolver.resolve("key-a").await.expect("cached resolve");
        assert_eq!(calls.get(), 1);
        assert_eq!(resolver.key_ids().await, vec!["key-a".to_string()]);
    }

    #[tokio::test]
    async fn unknown_kid_refetches_once() {
        let source = CountingSource::always(jwks_a());
        let calls = source.calls();
        let resolver = KeyResolver::new(source);

        resolver.resolve("key-a").await.expect("warm cache");
        let err = resolver.resolve("missing").await.err().expect("resolve should fail");
        assert!(matches!(err, KeyError::UnknownKey(ref kid) if kid == "missing"));
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn picks_up_rotated_key() {
        let source = CountingSource::sequence(vec![jwks_a(), jwks_ab()]);
        let calls = source.calls();
        let resolver = KeyResolver::new(source);

        resolver.resolve("key-a").await.expect("warm cache");
        resolver.resolve("key-b").await.expect("rotated key");
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn min_refresh_interval_suppresses_refetch() {
        let source = CountingSource::always(jwks_a());
        let calls = source.calls();
        let resolver = KeyResolver::new(source).min_refresh_interval(Duration::from_secs(60));

        resolver.resolve("key-a").await.expect("warm cache");
        assert!(resolver.resolve("missing").await.is_err());
        assert!(resolver.resolve("missing").await.is_err());
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn stale_set_is_refetched() {
        let source = CountingSource::always(jwks_a());
        let calls = source.calls();
        let resolver = KeyResolver::new(source).max_age(Duration::ZERO);

        resolver.resolve("key-a").await.expect("first");
        resolver.resolve("key-a").await.expect("second");
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn fetch_failure_is_reported() {
        let source = CountingSource::failing(|| KeyError::Status(503));
        let resolver = KeyResolver::new(source);

        let err = resolver.resolve("key-a").await.err().expect("resolve should fail");
        assert!(matches!(err, KeyError::Status(503)));
        assert!(err.is_fetch_failure());
    }

    #[tokio::test]
    async fn slow_source_times_out() {
        let source = CountingSource::delayed(jwks_a(), Duration::from_secs(5));
        let resolver = KeyResolver::new(source).fetch_timeout(Duration::from_millis(20));

        let err = resolver.resolve("key-a").await.err().expect("resolve should fail");
        assert!(matches!(err, KeyError::Timeout));
    }

    #[tokio::test]
    async fn skips_keys_without_kid_or_for_encryption() {
        let mut set = jwks_ab();
        set.keys[0].common.key_id = None;
        set.keys[1].common.public_key_use = Some(jsonwebtoken::jwk::PublicKeyUse::Encryption);
        let resolver = KeyResolver::new(StaticKeySource::new(set));

        resolver.refresh().await.expect("refresh");
        assert!(resolver.key_ids().await.is_empty());
    }

    #[test]
    fn unsupported_sibling_keys_are_skipped() {
        let key_a = serde_json::to_value(&jwks_a().keys[0]).unwrap();
        let document = serde_json::json!({
            "keys": [
                {"kty": "EC", "use": "enc", "alg": "ECDH-ES", "kid": "enc-1",
                 "crv": "P-256", "x": "AAAA", "y": "AAAA"},
                {"kty": "EC", "use": "sig", "alg": "ES256K", "kid": "k1-1",
                 "crv": "secp256k1", "x": "AAAA", "y": "AAAA"},
                key_a,
            ]
        });
        let set = parse_key_set(document.to_string().as_bytes()).expect("outer shape is valid");
        assert_eq!(set.keys.len(), 1);
        assert_eq!(set.keys[0].common.key_id.as_deref(), Some("key-a"));
    }

    #[test]
    fn empty_key_list_is_not_malformed() {
        let set = parse_key_set(br#"{"keys": []}"#).expect("empty set");
        assert!(set.keys.is_empty());
    }

    #[test]
    fn malformed_document() {
        let err = StaticKeySource::from_json("{\"not\": \"a key set\"}").err().unwrap();
        assert!(matches!(err, KeyError::Document(_)));
    }
}
