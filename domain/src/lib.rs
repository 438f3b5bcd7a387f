//! Accounts, sessions and third-party sign-in for localiday.
//!
//! Consumers of the `domain` crate do not need to depend on `oauth-exchange` directly:
//! the types that cross the layer boundary are re-exported here.
pub use oauth_exchange::{
    CallbackParams, ExternalIdentity, PendingStateStore, ProviderRegistry, TokenExchangeClient,
};

/// Identifier of users and roles.
pub type Id = uuid::Uuid;

pub mod accounts;
pub mod error;
pub mod oauth;
pub mod role;
pub mod session;
pub mod user;
