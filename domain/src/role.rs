use crate::Id;
use serde::Serialize;

pub const ROLE_USER: &str = "USER";
pub const ROLE_ADMIN: &str = "ADMIN";
pub const ROLE_SYSTEM_USER: &str = "SYSTEM_USER";
pub const ROLE_OPEN_AUTH_USER: &str = "OPEN_AUTH_USER";

/// Roles created on first start, in creation order.
pub const BOOTSTRAP_ROLES: &[&str] = &[
    ROLE_USER,
    ROLE_ADMIN,
    ROLE_SYSTEM_USER,
    ROLE_OPEN_AUTH_USER,
    "GOOGLE_USER",
    "FACEBOOK_USER",
    "TWITTER_USER",
];

/// An authority that can be granted to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Role {
    pub id: Id,
    pub authority: String,
}

impl Role {
    pub fn new(authority: &str) -> Self {
        Self {
            id: Id::new_v4(),
            authority: authority.to_string(),
        }
    }
}

/// Role granted to users who signed in through `provider`, e.g. `GOOGLE_USER`.
pub fn provider_role(provider: &str) -> String {
    format!("{}_USER", provider.to_uppercase())
}
