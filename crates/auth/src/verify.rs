//! Token verification: header, key, signature, then claims.

use crate::{
    claims::{Audience, ClaimSet, RawClaims},
    config::AuthConfig,
    error::{AuthError, ConfigError},
    jwks::KeyResolver,
};
use jsonwebtoken::{Algorithm, Header, Validation, errors::ErrorKind};

/// Validates bearer tokens against the issuer's published keys.
pub struct Verifier {
    resolver: KeyResolver,
    issuer: String,
    audience: String,
    algorithm: Algorithm,
    leeway: u64,
    validation: Validation,
}

impl Verifier {
    pub fn new(config: &AuthConfig, resolver: KeyResolver) -> Self {
        // Signature and algorithm only; claims are checked in `validate_claims`.
        let mut validation = Validation::new(config.algorithm);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            resolver,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            algorithm: config.algorithm,
            leeway: config.leeway,
            validation,
        }
    }

    /// Verifier fetching keys from `config.jwks_url`.
    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let resolver = KeyResolver::from_config(config)
            .map_err(|e| ConfigError::Invalid(format!("key set client: {e}")))?;
        Ok(Self::new(config, resolver))
    }

    pub fn resolver(&self) -> &KeyResolver {
        &self.resolver
    }

    /// Verify `token` as of now.
    pub async fn verify(&self, token: &str) -> Result<ClaimSet, AuthError> {
        self.verify_at(token, jsonwebtoken::get_current_timestamp()).await
    }

    /// Verify `token` as of `now` (seconds since the epoch).
    pub async fn verify_at(&self, token: &str, now: u64) -> Result<ClaimSet, AuthError> {
        let header = self.read_header(token)?;
        let kid = header.kid.as_deref().ok_or_else(|| {
            AuthError::InvalidTokenFormat("token header has no kid".into())
        })?;

        let key = self.resolver.resolve(kid).await?;

        let data = jsonwebtoken::decode::<RawClaims>(token, &key, &self.validation)
            .map_err(decode_error)?;

        self.validate_claims(data.claims, now)
    }

    /// Decode the unverified header and pin the algorithm before any key
    /// lookup happens.
    fn read_header(&self, token: &str) -> Result<Header, AuthError> {
        let segments = token.split('.').collect::<Vec<_>>();
        if segments.len() != 3 || segments.iter().any(|s| s.is_empty()) {
            return Err(AuthError::InvalidTokenFormat(
                "token must have header, payload and signature segments".into(),
            ));
        }

        let header = jsonwebtoken::decode_header(token).map_err(|e| {
            AuthError::InvalidTokenFormat(format!("unable to parse token header: {e}"))
        })?;

        if header.alg != self.algorithm {
            return Err(AuthError::InvalidTokenFormat(format!(
                "unexpected signing algorithm {:?}",
                header.alg
            )));
        }
        Ok(header)
    }

    fn validate_claims(&self, raw: RawClaims, now: u64) -> Result<ClaimSet, AuthError> {
        let exp = raw
            .exp
            .ok_or_else(|| AuthError::ClaimMismatch("missing exp claim".into()))?;
        if exp.saturating_add(self.leeway) <= now {
            return Err(AuthError::TokenExpired);
        }

        let audience = raw.aud.map(Audience::into_vec).unwrap_or_default();
        if !audience.iter().any(|aud| *aud == self.audience) {
            return Err(AuthError::ClaimMismatch("incorrect audience".into()));
        }

        let issuer = raw.iss.unwrap_or_default();
        if issuer != self.issuer {
            return Err(AuthError::ClaimMismatch("incorrect issuer".into()));
        }

        Ok(ClaimSet::new(
            issuer,
            audience,
            raw.sub.unwrap_or_default(),
            exp,
            raw.iat,
            raw.permissions,
        ))
    }
}

fn decode_error(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidAudience
        | ErrorKind::InvalidIssuer
        | ErrorKind::InvalidSubject
        | ErrorKind::ImmatureSignature
        | ErrorKind::MissingRequiredClaim(_) => AuthError::ClaimMismatch(err.to_string()),
        _ => AuthError::InvalidTokenFormat(format!("unable to decode token: {err}")),
    }
}
