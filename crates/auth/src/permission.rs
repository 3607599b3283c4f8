//! Permission enforcement on verified claims.

use crate::{claims::ClaimSet, error::AuthError};
use std::{borrow::Cow, fmt};

/// A capability a protected operation requires, e.g. `post:drinks`.
///
/// Matching is exact and case-sensitive.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const fn new(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn owned(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read the long form of every drink, including recipes.
pub const GET_DRINKS_DETAIL: Permission = Permission::new("get:drinks-detail");
/// Create a drink.
pub const POST_DRINKS: Permission = Permission::new("post:drinks");
/// Update a drink.
pub const PATCH_DRINKS: Permission = Permission::new("patch:drinks");
/// Delete a drink.
pub const DELETE_DRINKS: Permission = Permission::new("delete:drinks");

/// Check that `claims` grants `required`.
///
/// A token without any `permissions` claim fails differently from one whose
/// claim lacks `required`: the former means the issuer is not configured to
/// add permissions to its tokens.
pub fn check_permission(claims: &ClaimSet, required: &Permission) -> Result<(), AuthError> {
    if !claims.has_permissions_claim() {
        return Err(AuthError::PermissionsClaimMissing);
    }
    if claims.permissions().iter().any(|p| p == required.as_str()) {
        Ok(())
    } else {
        Err(AuthError::PermissionDenied(required.to_string()))
    }
}
