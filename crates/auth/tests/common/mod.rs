#![allow(dead_code)]

use drinks_auth::{AuthConfig, Guard, JwkSet, KeyResolver, StaticKeySource, Verifier};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};

pub const RSA_A: &str = include_str!("../fixtures/rsa_a.pem");
pub const RSA_B: &str = include_str!("../fixtures/rsa_b.pem");
pub const JWKS_A: &str = include_str!("../fixtures/jwks_a.json");
pub const JWKS_AB: &str = include_str!("../fixtures/jwks_ab.json");
pub const ISSUER: &str = "https://coffee.example.com/";
pub const AUDIENCE: &str = "drinks";

pub fn config() -> AuthConfig {
    AuthConfig::new(ISSUER, AUDIENCE, "https://coffee.example.com/.well-known/jwks.json")
}

pub fn key_set(document: &str) -> JwkSet {
    serde_json::from_str(document).expect("key set fixture")
}

pub fn static_guard(document: &str) -> Guard {
    let source = StaticKeySource::from_json(document).expect("key set fixture");
    Guard::new(Verifier::new(&config(), KeyResolver::new(source)))
}

pub fn payload(permissions: Option<&[&str]>) -> Value {
    let now = jsonwebtoken::get_current_timestamp();
    let mut claims = json!({
        "iss": ISSUER,
        "aud": AUDIENCE,
        "sub": "auth0|manager",
        "iat": now,
        "exp": now + 600,
    });
    if let Some(permissions) = permissions {
        claims["permissions"] = json!(permissions);
    }
    claims
}

pub fn sign(claims: &Value, kid: &str, pem: &str) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.into());
    let key = EncodingKey::from_rsa_pem(pem.as_bytes()).expect("rsa fixture");
    jsonwebtoken::encode(&header, claims, &key).expect("sign")
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
