//! OAuth 1.0a: parameter building, HMAC-SHA1 signing and the token legs.

pub mod client;
pub mod params;
pub mod signature;

pub use client::TokenPair;
pub use params::OAuthParams;
