//! Authorization failure taxonomy.
//!
//! Every negative path of the guard produces exactly one [`AuthError`]. Each
//! error carries a stable [`AuthErrorKind`], an HTTP status, and a snake_case
//! code so transport layers can render it without inspecting the message.

use http::StatusCode;
use thiserror::Error;

/// Why authorization failed.
#[derive(Error, Debug)]
pub enum AuthError {
    /// No `Authorization` header was presented.
    #[error("authorization header is expected")]
    MissingHeader,

    /// The header is present but is not `Bearer <token>`.
    #[error("{0}")]
    MalformedHeader(&'static str),

    /// The token cannot be decoded or declares a disallowed algorithm.
    #[error("{0}")]
    InvalidTokenFormat(String),

    /// No signing key could be obtained for the token.
    #[error("unable to find the appropriate key: {0}")]
    KeyResolution(#[from] KeyError),

    /// The signature does not match the resolved key.
    #[error("token signature is invalid")]
    InvalidSignature,

    /// The token's validity window has passed.
    #[error("token expired")]
    TokenExpired,

    /// Issuer, audience, or another required claim is wrong or missing.
    #[error("incorrect claims: {0}")]
    ClaimMismatch(String),

    /// The token carries no `permissions` claim at all.
    #[error("permissions not included in token")]
    PermissionsClaimMissing,

    /// The token lacks the permission the operation requires.
    #[error("permission not found: {0}")]
    PermissionDenied(String),
}

/// Stable discriminant of an [`AuthError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthErrorKind {
    MissingHeader,
    MalformedHeader,
    InvalidTokenFormat,
    KeyResolutionError,
    InvalidSignature,
    TokenExpired,
    ClaimMismatch,
    PermissionsClaimMissing,
    PermissionDenied,
}

impl AuthError {
    pub fn kind(&self) -> AuthErrorKind {
        match self {
            AuthError::MissingHeader => AuthErrorKind::MissingHeader,
            AuthError::MalformedHeader(_) => AuthErrorKind::MalformedHeader,
            AuthError::InvalidTokenFormat(_) => AuthErrorKind::InvalidTokenFormat,
            AuthError::KeyResolution(_) => AuthErrorKind::KeyResolutionError,
            AuthError::InvalidSignature => AuthErrorKind::InvalidSignature,
            AuthError::TokenExpired => AuthErrorKind::TokenExpired,
            AuthError::ClaimMismatch(_) => AuthErrorKind::ClaimMismatch,
            AuthError::PermissionsClaimMissing => AuthErrorKind::PermissionsClaimMissing,
            AuthError::PermissionDenied(_) => AuthErrorKind::PermissionDenied,
        }
    }

    /// HTTP status the failure is surfaced as.
    ///
    /// Everything is `401` except a missing permission (`403`) and a key set
    /// that could not be fetched at all (`500`). A key set that was fetched
    /// but has no matching `kid` stays `401`.
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AuthError::KeyResolution(e) if e.is_fetch_failure() => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self.kind() {
            AuthErrorKind::MissingHeader => "authorization_header_missing",
            AuthErrorKind::MalformedHeader => "invalid_header",
            AuthErrorKind::InvalidTokenFormat => "invalid_token",
            AuthErrorKind::KeyResolutionError => "key_resolution_failed",
            AuthErrorKind::InvalidSignature => "invalid_signature",
            AuthErrorKind::TokenExpired => "token_expired",
            AuthErrorKind::ClaimMismatch => "invalid_claims",
            AuthErrorKind::PermissionsClaimMissing => "permissions_missing",
            AuthErrorKind::PermissionDenied => "unauthorized",
        }
    }
}

/// Causes of [`AuthError::KeyResolution`].
#[derive(Error, Debug)]
pub enum KeyError {
    /// The key set was obtained but has no usable key with this id.
    #[error("no signing key matches kid `{0}`")]
    UnknownKey(String),

    /// The key set endpoint did not answer within the fetch timeout.
    #[error("key set request timed out")]
    Timeout,

    /// The request to the key set endpoint failed.
    #[error("key set request failed: {0}")]
    Transport(String),

    /// The key set endpoint answered with a non-success status.
    #[error("key set endpoint returned status {0}")]
    Status(u16),

    /// The response body is not a JSON Web Key Set.
    #[error("malformed key set document: {0}")]
    Document(String),
}

impl KeyError {
    /// Whether the key set itself could not be obtained, as opposed to a
    /// well-formed set lacking the requested key.
    pub fn is_fetch_failure(&self) -> bool {
        !matches!(self, KeyError::UnknownKey(_))
    }
}

/// Invalid [`AuthConfig`](crate::AuthConfig).
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
