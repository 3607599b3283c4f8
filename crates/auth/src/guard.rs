//! The single authorization entry point for protected operations.

use crate::{
    claims::ClaimSet,
    config::AuthConfig,
    error::{AuthError, ConfigError},
    extract::{bearer_token, bearer_token_from_headers},
    permission::{Permission, check_permission},
    verify::Verifier,
};
use http::HeaderMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Extracts, verifies, and checks a request's credential.
///
/// Cheap to clone; clones share the verifier and its cached key set.
///
/// ```rust,ignore
/// use drinks_auth::{AuthConfig, Guard, permission::POST_DRINKS};
///
/// let guard = Guard::from_config(&AuthConfig::for_tenant("coffee.auth0.com", "drinks"))?;
///
/// async fn create_drink(guard: &Guard, headers: &http::HeaderMap) -> Result<(), AuthError> {
///     let claims = guard.authorize_headers(headers, POST_DRINKS).await?;
///     // ... insert the drink on behalf of claims.subject()
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Guard {
    verifier: Arc<Verifier>,
}

impl Guard {
    pub fn new(verifier: Verifier) -> Self {
        Self {
            verifier: Arc::new(verifier),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigError> {
        Verifier::from_config(config).map(Self::new)
    }

    pub fn verifier(&self) -> &Verifier {
        &self.verifier
    }

    /// Authorize a raw `Authorization` header value for `required`.
    ///
    /// Returns the verified claims only if every step passes; the first
    /// failing step's error is returned as is.
    pub async fn authorize(
        &self,
        header: Option<&str>,
        required: Permission,
    ) -> Result<ClaimSet, AuthError> {
        let result = self.run(bearer_token(header), &required).await;
        log_outcome(&result, &required);
        result
    }

    /// Like [`authorize`](Self::authorize), reading the header from a map.
    pub async fn authorize_headers(
        &self,
        headers: &HeaderMap,
        required: Permission,
    ) -> Result<ClaimSet, AuthError> {
        let result = self.run(bearer_token_from_headers(headers), &required).await;
        log_outcome(&result, &required);
        result
    }

    async fn run(
        &self,
        token: Result<&str, AuthError>,
        required: &Permission,
    ) -> Result<ClaimSet, AuthError> {
        let claims = self.verifier.verify(token?).await?;
        check_permission(&claims, required)?;
        Ok(claims)
    }
}

fn log_outcome(result: &Result<ClaimSet, AuthError>, required: &Permission) {
    match result {
        Ok(claims) => debug!(subject = claims.subject(), %required, "request authorized"),
        Err(e) => warn!(
            kind = ?e.kind(),
            code = e.code(),
            status = e.status().as_u16(),
            %required,
            error = %e,
            "request denied"
        ),
    }
}
