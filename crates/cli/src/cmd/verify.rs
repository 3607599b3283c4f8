//! Command for verifying a single token.

use crate::error::Error;
use drinks_auth::{
    AuthConfig, AuthError, ClaimSet, Guard, KeyResolver, Permission, StaticKeySource, Verifier,
};
use serde_json::{Value, json};
use std::path::Path;

/// Build a verifier that fetches keys from the issuer, or reads them from
/// `jwks_file` when given.
pub fn verifier(config: &AuthConfig, jwks_file: Option<&Path>) -> Result<Verifier, Error> {
    match jwks_file {
        Some(path) => {
            let document = std::fs::read_to_string(path)?;
            let source = StaticKeySource::from_json(&document)?;
            Ok(Verifier::new(config, KeyResolver::with_config(source, config)))
        }
        None => Ok(Verifier::from_config(config)?),
    }
}

/// Verify `token`, and check `permission` if given.
pub async fn verify(
    verifier: Verifier,
    token: &str,
    permission: Option<String>,
) -> Result<ClaimSet, AuthError> {
    match permission {
        Some(permission) => {
            let header = format!("Bearer {token}");
            Guard::new(verifier)
                .authorize(Some(&header), Permission::owned(permission))
                .await
        }
        None => verifier.verify(token).await,
    }
}

/// JSON description of a failure, in the API's error envelope shape.
pub fn envelope(err: &AuthError) -> Value {
    json!({
        "success": false,
        "error": err.status().as_u16(),
        "code": err.code(),
        "message": err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use crate::cmd::verify::{envelope, verifier, verify};
    use drinks_auth::{AuthConfig, AuthError};
    use jsonwebtoken::{Algorithm, EncodingKey, Header};
    use serde_json::json;
    use std::path::Path;

    const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../auth/tests/fixtures");

    fn config() -> AuthConfig {
        AuthConfig::new(
            "https://coffee.example.com/",
            "drinks",
            "https://coffee.example.com/jwks.json",
        )
    }

    fn token(permissions: &[&str]) -> String {
        let now = jsonwebtoken::get_current_timestamp();
        let claims = json!({
            "iss": "https://coffee.example.com/",
            "aud": "drinks",
            "sub": "auth0|ops",
            "exp": now + 60,
            "permissions": permissions,
        });
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some("key-a".into());
        let pem = include_str!("../../../auth/tests/fixtures/rsa_a.pem");
        let key = EncodingKey::from_rsa_pem(pem.as_bytes()).unwrap();
        jsonwebtoken::encode(&header, &claims, &key).unwrap()
    }

    #[tokio::test]
    async fn verifies_with_key_file() {
        let path = Path::new(FIXTURES).join("jwks_a.json");
        let verifier = verifier(&config(), Some(&path)).unwrap();
        let claims = verify(verifier, &token(&["patch:drinks"]), Some("patch:drinks".into()))
            .await
            .unwrap();
        assert_eq!(claims.subject(), "auth0|ops");
    }

    #[tokio::test]
    async fn reports_denial() {
        let path = Path::new(FIXTURES).join("jwks_a.json");
        let verifier = verifier(&config(), Some(&path)).unwrap();
        let err = verify(verifier, &token(&[]), Some("delete:drinks".into()))
            .await
            .unwrap_err();
        assert_eq!(
            envelope(&err),
            json!({
                "success": false,
                "error": 403,
                "code": "unauthorized",
                "message": "permission not found: delete:drinks",
            })
        );
    }

    #[test]
    fn missing_key_file() {
        let path = Path::new(FIXTURES).join("missing.json");
        assert!(verifier(&config(), Some(&path)).is_err());
    }

    #[test]
    fn envelope_for_missing_header() {
        let value = envelope(&AuthError::MissingHeader);
        assert_eq!(value["error"], 401);
        assert_eq!(value["code"], "authorization_header_missing");
    }
}
