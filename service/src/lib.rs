use config::Config;
use domain::accounts::Accounts;
use domain::error::Error;
use domain::{PendingStateStore, ProviderRegistry, TokenExchangeClient};
use log::info;
use oauth_exchange::http::ProviderClientBuilder;
use std::sync::Arc;

pub mod config;
pub mod logging;

/// Load the provider registry and build the exchange client from configuration.
pub fn init_exchange_client(config: &Config) -> Result<TokenExchangeClient, Error> {
    let registry = ProviderRegistry::load(&config.oauth_config_path, &config.host_url)?;
    info!(
        "Loaded {} OAuth providers: {}",
        registry.len(),
        registry.names().join(", ")
    );

    let pending = match config.pending_state_ttl() {
        Some(ttl) => {
            info!("Pending OAuth logins expire after {}s", ttl.as_secs());
            PendingStateStore::with_ttl(chrono_duration(ttl))
        }
        None => PendingStateStore::new(),
    };

    let http = ProviderClientBuilder::new()
        .with_timeout(config.http_timeout())
        .build()
        .map_err(oauth_exchange::Error::from)?;

    Ok(TokenExchangeClient::new(Arc::new(registry), pending, http))
}

/// Create the account store and its bootstrap data.
pub fn init_accounts(config: &Config) -> Result<Accounts, Error> {
    let accounts = Accounts::new(chrono_duration(config.session_timeout()));
    accounts.bootstrap(config.admin_password())?;
    info!(
        "There are {} users and {} active users in the system.",
        accounts.count_users(),
        accounts.count_active_users()
    );
    Ok(accounts)
}

fn chrono_duration(duration: std::time::Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::days(36_500))
}

// Service-level state shared by every request handler.
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub exchange: Arc<TokenExchangeClient>,
    pub accounts: Arc<Accounts>,
}

impl AppState {
    pub fn new(app_config: Config, exchange: TokenExchangeClient, accounts: Accounts) -> Self {
        Self {
            config: app_config,
            exchange: Arc::new(exchange),
            accounts: Arc::new(accounts),
        }
    }

    /// Build the full application state from configuration.
    pub fn init(app_config: Config) -> Result<Self, Error> {
        let exchange = init_exchange_client(&app_config)?;
        let accounts = init_accounts(&app_config)?;
        Ok(Self::new(app_config, exchange, accounts))
    }

    pub fn exchange_ref(&self) -> &TokenExchangeClient {
        self.exchange.as_ref()
    }

    pub fn accounts_ref(&self) -> &Accounts {
        self.accounts.as_ref()
    }
}
