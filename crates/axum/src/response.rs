//! JSON error envelope and RFC 6750 challenges.
//!
//! Every error the drinks API returns has the same body:
//!
//! ```json
//! {"success": false, "error": 401, "message": "token expired"}
//! ```

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use drinks_auth::{AuthError, AuthErrorKind};
use http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE};
use serde::{Deserialize, Serialize};

/// Body of every error response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    /// HTTP status code.
    pub error: u16,
    pub message: String,
}

impl ErrorEnvelope {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: status.as_u16(),
            message: message.into(),
        }
    }

    /// Envelope with the API's standard message for `status`.
    pub fn for_status(status: StatusCode) -> Self {
        Self::new(status, standard_message(status))
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.error).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ErrorEnvelope {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// The API's message for each status it produces.
pub fn standard_message(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "bad request",
        StatusCode::UNAUTHORIZED => "Authorization error",
        StatusCode::FORBIDDEN => "forbidden",
        StatusCode::NOT_FOUND => "resource not found",
        StatusCode::UNPROCESSABLE_ENTITY => "unprocessable",
        StatusCode::INTERNAL_SERVER_ERROR => "Internal Server Error",
        other => other.canonical_reason().unwrap_or("error"),
    }
}

/// An authorization failure rendered as an HTTP response.
///
/// 401 and 403 responses carry a `WWW-Authenticate: Bearer` challenge. Key
/// set fetch failures render as a plain 500 without their cause.
#[derive(Debug)]
pub struct Rejection {
    error: AuthError,
    realm: String,
    detailed: bool,
}

impl Rejection {
    pub fn new(error: AuthError) -> Self {
        Self {
            error,
            realm: crate::DEFAULT_REALM.to_string(),
            detailed: true,
        }
    }

    pub fn realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }

    /// Use [`standard_message`] for every status, so a 401 body reads
    /// `"Authorization error"`. The cause still goes in the challenge.
    pub fn standard_messages(mut self) -> Self {
        self.detailed = false;
        self
    }

    /// Body of the response.
    pub fn envelope(&self) -> ErrorEnvelope {
        let status = self.error.status();
        if self.detailed && !status.is_server_error() {
            ErrorEnvelope::new(status, self.error.to_string())
        } else {
            ErrorEnvelope::for_status(status)
        }
    }

    pub fn error(&self) -> &AuthError {
        &self.error
    }

    /// Value of the `WWW-Authenticate` header, if the status calls for one.
    pub fn challenge(&self) -> Option<HeaderValue> {
        let realm = quote(&self.realm);
        let value = match (&self.error, self.error.status()) {
            // RFC 6750 §3.1: no error code when no credential was sent.
            (AuthError::MissingHeader, _) => format!("Bearer realm=\"{realm}\""),
            (AuthError::PermissionDenied(scope), _) => format!(
                "Bearer realm=\"{realm}\", error=\"insufficient_scope\", scope=\"{}\"",
                quote(scope)
            ),
            (_, StatusCode::UNAUTHORIZED) => {
                let code = match self.error.kind() {
                    AuthErrorKind::MalformedHeader => "invalid_request",
                    _ => "invalid_token",
                };
                format!(
                    "Bearer realm=\"{realm}\", error=\"{code}\", error_description=\"{}\"",
                    quote(&self.error.to_string())
                )
            }
            _ => return None,
        };
        HeaderValue::from_str(&value).ok()
    }
}

impl From<AuthError> for Rejection {
    fn from(error: AuthError) -> Self {
        Self::new(error)
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let envelope = self.envelope();
        let challenge = self.challenge();
        let mut response = envelope.into_response();
        if let Some(challenge) = challenge {
            response.headers_mut().insert(WWW_AUTHENTICATE, challenge);
        }
        response
    }
}

/// Make `s` safe inside a quoted-string.
fn quote(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control())
        .map(|c| if c == '"' || c == '\\' { '\'' } else { c })
        .collect()
}
