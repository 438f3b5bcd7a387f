//! # oauth-exchange
//!
//! Third-party sign-in over OAuth 1.0a and OAuth 2.0:
//! - provider configuration loaded from YAML with credentials from the environment
//! - OAuth 1.0a HMAC-SHA1 request signing and the three signed legs
//! - OAuth 2.0 authorization-code flow
//! - single-use pending attempts correlating redirects with callbacks
//! - normalization of provider profiles into an `ExternalIdentity`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use oauth_exchange::{CallbackParams, PendingStateStore, ProviderRegistry, TokenExchangeClient};
//!
//! let registry = Arc::new(ProviderRegistry::load("conf/oauth_config.yaml", host_url)?);
//! let client = TokenExchangeClient::new(registry, PendingStateStore::new(), http);
//! let redirect = client.begin("google").await?;
//! // ... later, on the callback:
//! let completed = client.complete_exchange("google", &params).await?;
//! ```

pub mod error;
pub mod exchange;
pub mod flow;
pub mod http;
pub mod oauth1;
pub mod oauth2;
pub mod profile;
pub mod provider;
pub mod state;

pub use error::{Error, ErrorKind};
pub use exchange::{CallbackParams, CompletedExchange, TokenExchangeClient};
pub use flow::{FlowAttempt, FlowStage};
pub use profile::ExternalIdentity;
pub use provider::{OAuthVersion, ProviderConfig, ProviderRegistry};
pub use state::PendingStateStore;
