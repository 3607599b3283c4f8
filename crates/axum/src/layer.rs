//! Tower middleware that guards a route with a required permission.

use crate::response::Rejection;
use axum::response::IntoResponse;
use drinks_auth::{Guard, Permission};
use futures::future::BoxFuture;
use http::{Request, Response};
use std::task::{Context, Poll};

/// Tower [`Layer`](tower::Layer) that applies [`GuardService`].
///
/// One layer per protected route, each with the permission that route
/// requires.
#[derive(Clone)]
pub struct GuardLayer {
    guard: Guard,
    permission: Permission,
    realm: String,
    standard_messages: bool,
}

impl GuardLayer {
    pub fn new(guard: Guard, permission: Permission) -> Self {
        Self {
            guard,
            permission,
            realm: crate::DEFAULT_REALM.to_string(),
            standard_messages: false,
        }
    }

    /// Realm named in `WWW-Authenticate` challenges.
    pub fn realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }

    /// Answer with the fixed message for each status instead of the cause.
    /// See [`Rejection::standard_messages`].
    pub fn standard_messages(mut self) -> Self {
        self.standard_messages = true;
        self
    }
}

impl<S> tower::Layer<S> for GuardLayer {
    type Service = GuardService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GuardService {
            guard: self.guard.clone(),
            permission: self.permission.clone(),
            realm: self.realm.clone(),
            standard_messages: self.standard_messages,
            inner,
        }
    }
}

/// Tower service that authorizes requests before forwarding them.
///
/// On success the [`ClaimSet`](drinks_auth::ClaimSet) is inserted into the
/// request extensions; handlers receive it with
/// `Extension(claims): Extension<ClaimSet>`.
#[derive(Clone)]
pub struct GuardService<S> {
    guard: Guard,
    permission: Permission,
    realm: String,
    standard_messages: bool,
    inner: S,
}

impl<S, B> tower::Service<Request<B>> for GuardService<S>
where
    S: tower::Service<Request<B>, Response = Response<axum::body::Body>> + Clone + Send + 'static,
    S::Future: Send,
    S::Error: Send,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        let guard = self.guard.clone();
        let permission = self.permission.clone();
        let realm = self.realm.clone();
        let standard_messages = self.standard_messages;
        let mut inner = self.inner.clone();
        // swap to ensure poll_ready state is preserved
        std::mem::swap(&mut self.inner, &mut inner);

        Box::pin(async move {
            let (mut parts, body) = req.into_parts();

            match guard.authorize_headers(&parts.headers, permission).await {
                Ok(claims) => {
                    parts.extensions.insert(claims);
                    inner.call(Request::from_parts(parts, body)).await
                }
                Err(err) => {
                    let mut rejection = Rejection::new(err).realm(realm);
                    if standard_messages {
                        rejection = rejection.standard_messages();
                    }
                    Ok(rejection.into_response())
                }
            }
        })
    }
}
