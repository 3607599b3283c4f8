//! Verified token claims.

use serde::{Deserialize, Serialize};

/// Claims of a token whose signature and claims have been validated.
///
/// Only [`Verifier`](crate::Verifier) constructs this type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClaimSet {
    issuer: String,
    audience: Vec<String>,
    subject: String,
    expires_at: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    issued_at: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    permissions: Option<Vec<String>>,
}

impl ClaimSet {
    pub(crate) fn new(
        issuer: String,
        audience: Vec<String>,
        subject: String,
        expires_at: u64,
        issued_at: Option<u64>,
        permissions: Option<Vec<String>>,
    ) -> Self {
        Self {
            issuer,
            audience,
            subject,
            expires_at,
            issued_at,
            permissions,
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &[String] {
        &self.audience
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Expiry, in seconds since the epoch.
    pub fn expires_at(&self) -> u64 {
        self.expires_at
    }

    pub fn issued_at(&self) -> Option<u64> {
        self.issued_at
    }

    /// Granted permissions, in token order. Empty if the claim is absent.
    pub fn permissions(&self) -> &[String] {
        self.permissions.as_deref().unwrap_or_default()
    }

    /// Whether the token carried a `permissions` claim at all.
    pub fn has_permissions_claim(&self) -> bool {
        self.permissions.is_some()
    }
}

/// Payload as it appears in the token, before validation.
#[derive(Debug, Deserialize)]
pub(crate) struct RawClaims {
    pub iss: Option<String>,
    pub aud: Option<Audience>,
    pub sub: Option<String>,
    pub exp: Option<u64>,
    pub iat: Option<u64>,
    pub permissions: Option<Vec<String>>,
}

/// `aud` may be a single string or an array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Audience {
    Single(String),
    Multiple(Vec<String>),
}

impl Audience {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Audience::Single(s) => vec![s],
            Audience::Multiple(v) => v,
        }
    }
}
