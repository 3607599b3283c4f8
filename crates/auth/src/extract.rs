//! Bearer credential extraction from the `Authorization` header.

use crate::error::AuthError;
use http::HeaderMap;

/// Extract the token from an `Authorization: Bearer <token>` header value.
///
/// The scheme is matched case-insensitively. Anything other than exactly
/// two whitespace-separated parts is rejected.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingHeader)?;
    let mut parts = header.split_whitespace();

    let scheme = parts.next().ok_or(AuthError::MalformedHeader(
        "authorization header must start with \"Bearer\"",
    ))?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MalformedHeader(
            "authorization header must start with \"Bearer\"",
        ));
    }

    let token = parts
        .next()
        .ok_or(AuthError::MalformedHeader("token not found"))?;

    if parts.next().is_some() {
        return Err(AuthError::MalformedHeader(
            "authorization header must be bearer token",
        ));
    }

    Ok(token)
}

/// Extract the bearer token from a request's headers.
///
/// A header value that is not visible ASCII counts as malformed.
pub fn bearer_token_from_headers(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = match headers.get(http::header::AUTHORIZATION) {
        Some(value) => value,
        None => return Err(AuthError::MissingHeader),
    };
    let value = value.to_str().map_err(|_| {
        AuthError::MalformedHeader("authorization header is not valid ASCII")
    })?;
    bearer_token(Some(value))
}
