//! Fixtures shared by the unit tests.

use crate::error::KeyError;
use crate::jwks::KeySource;
use futures::future::BoxFuture;
use jsonwebtoken::{Algorithm, EncodingKey, Header, jwk::JwkSet};
use serde_json::{Value, json};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

pub(crate) const RSA_A: &str = include_str!("../tests/fixtures/rsa_a.pem");
pub(crate) const RSA_B: &str = include_str!("../tests/fixtures/rsa_b.pem");
pub(crate) const ISSUER: &str = "https://coffee.example.com/";
pub(crate) const AUDIENCE: &str = "drinks";

pub(crate) fn jwks_a() -> JwkSet {
    serde_json::from_str(include_str!("../tests/fixtures/jwks_a.json")).expect("jwks_a fixture")
}

pub(crate) fn jwks_ab() -> JwkSet {
    serde_json::from_str(include_str!("../tests/fixtures/jwks_ab.json")).expect("jwks_ab fixture")
}

/// Payload valid for an hour, with the given permissions claim.
pub(crate) fn payload(permissions: Option<&[&str]>) -> Value {
    let now = jsonwebtoken::get_current_timestamp();
    let mut claims = json!({
        "iss": ISSUER,
        "aud": AUDIENCE,
        "sub": "auth0|barista",
        "iat": now,
        "exp": now + 3600,
    });
    if let Some(permissions) = permissions {
        claims["permissions"] = json!(permissions);
    }
    claims
}

pub(crate) fn sign(claims: &Value, kid: &str, pem: &str) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    let key = EncodingKey::from_rsa_pem(pem.as_bytes()).expect("rsa fixture");
    jsonwebtoken::encode(&header, claims, &key).expect("sign")
}

#[derive(Clone)]
pub(crate) struct Calls(Arc<AtomicUsize>);

impl Calls {
    pub(crate) fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

type Respond = Box<dyn Fn(usize) -> Result<JwkSet, KeyError> + Send + Sync>;

/// Key source that counts fetches.
pub(crate) struct CountingSource {
    calls: Arc<AtomicUsize>,
    respond: Respond,
    delay: Option<Duration>,
}

impl CountingSource {
    fn with(respond: Respond) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            respond,
            delay: None,
        }
    }

    pub(crate) fn always(set: JwkSet) -> Self {
        Self::with(Box::new(move |_| Ok(set.clone())))
    }

    /// Answers with `sets[n]` on the n-th fetch, repeating the last one.
    pub(crate) fn sequence(sets: Vec<JwkSet>) -> Self {
        Self::with(Box::new(move |n| Ok(sets[n.min(sets.len() - 1)].clone())))
    }

    pub(crate) fn failing(err: fn() -> KeyError) -> Self {
        Self::with(Box::new(move |_| Err(err())))
    }

    pub(crate) fn delayed(set: JwkSet, delay: Duration) -> Self {
        let mut source = Self::always(set);
        source.delay = Some(delay);
        source
    }

    pub(crate) fn calls(&self) -> Calls {
        Calls(self.calls.clone())
    }
}

impl KeySource for CountingSource {
    fn fetch(&self) -> BoxFuture<'_, Result<JwkSet, KeyError>> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            (self.respond)(n)
        })
    }
}
