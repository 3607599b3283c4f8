//! # drinks-auth-axum
//!
//! Serve [drinks-auth](drinks_auth) guarded routes with
//! [axum](https://docs.rs/axum).
//!
//! ## Guard Middleware
//!
//! [`GuardLayer`] runs the [`Guard`](drinks_auth::Guard) in front of a route
//! and rejects the request with a JSON [`ErrorEnvelope`] when authorization
//! fails. Apply it per route with `route_layer` so each operation declares
//! its own permission.
//!
//! ```rust,ignore
//! use axum::{Extension, Router, routing::{get, patch}};
//! use drinks_auth::{AuthConfig, ClaimSet, Guard, permission::{GET_DRINKS_DETAIL, PATCH_DRINKS}};
//! use drinks_auth_axum::GuardLayer;
//!
//! async fn drinks_detail(Extension(claims): Extension<ClaimSet>) -> String {
//!     format!("drinks for {}", claims.subject())
//! }
//!
//! let guard = Guard::from_config(&AuthConfig::for_tenant("coffee.auth0.com", "drinks"))?;
//!
//! let app = Router::new()
//!     .route("/drinks", get(list_drinks))
//!     .route(
//!         "/drinks-detail",
//!         get(drinks_detail).route_layer(GuardLayer::new(guard.clone(), GET_DRINKS_DETAIL)),
//!     )
//!     .route(
//!         "/drinks/{id}",
//!         patch(update_drink).route_layer(GuardLayer::new(guard, PATCH_DRINKS)),
//!     );
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! ```

pub use drinks_auth;

mod layer;
pub mod response;

pub use layer::{GuardLayer, GuardService};
pub use response::{ErrorEnvelope, Rejection};

/// Realm used in `WWW-Authenticate` challenges unless configured otherwise.
pub const DEFAULT_REALM: &str = "drinks";
