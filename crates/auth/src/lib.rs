//! # drinks-auth
//!
//! Bearer token authorization for the drinks API.
//!
//! A protected operation calls [`Guard::authorize`] with the request's
//! `Authorization` header and the [`Permission`] it requires. The guard
//! extracts the bearer token, verifies it against the issuer's JSON Web Key
//! Set, and checks the permission, returning the verified [`ClaimSet`] or
//! the first [`AuthError`] encountered:
//!
//! ```text
//! header ─▶ bearer_token ─▶ Verifier ─▶ check_permission ─▶ ClaimSet
//!                              │
//!                              ▼
//!                         KeyResolver ─▶ KeySource (HTTP or static)
//! ```
//!
//! ```rust,ignore
//! use drinks_auth::{AuthConfig, Guard, permission::GET_DRINKS_DETAIL};
//!
//! let config = AuthConfig::for_tenant("coffee.auth0.com", "drinks");
//! let guard = Guard::from_config(&config)?;
//!
//! match guard.authorize(request_header, GET_DRINKS_DETAIL).await {
//!     Ok(claims) => list_drinks_long(claims).await,
//!     Err(err) => respond(err.status(), err.code(), err.to_string()),
//! }
//! ```

mod claims;
mod config;
mod error;
mod extract;
mod guard;
mod jwks;
pub mod permission;
mod verify;

#[cfg(test)]
mod test_support;

pub use claims::ClaimSet;
pub use config::AuthConfig;
pub use error::{AuthError, AuthErrorKind, ConfigError, KeyError};
pub use extract::{bearer_token, bearer_token_from_headers};
pub use guard::Guard;
pub use jwks::{HttpKeySource, KeyResolver, KeySource, StaticKeySource, parse_key_set};
pub use permission::{Permission, check_permission};
pub use verify::Verifier;

pub use jsonwebtoken::{Algorithm, jwk::JwkSet};
