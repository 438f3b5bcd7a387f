//! Identity provider configuration and lookup.

mod config;
mod registry;

pub use config::{callback_url, OAuthVersion, ProviderConfig, Protocol};
pub use registry::ProviderRegistry;
