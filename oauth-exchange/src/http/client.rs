//! HTTP client used for provider calls.

use std::time::Duration;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout applied to every provider leg.
    pub timeout: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: format!("oauth-exchange/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Builder for the client shared by all provider legs.
///
/// Provider calls are never retried: a failed leg surfaces to the caller
/// immediately, so the only policy configured here is the timeout.
pub struct ProviderClientBuilder {
    config: HttpClientConfig,
}

impl ProviderClientBuilder {
    /// Create a new client builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: HttpClientConfig::default(),
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the user agent string.
    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.config.user_agent = user_agent;
        self
    }

    pub fn build(self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .timeout(self.config.timeout)
            .user_agent(self.config.user_agent)
            .build()
    }
}

impl Default for ProviderClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_default_timeout_is_ten_seconds() {
        let builder = ProviderClientBuilder::new();
        assert_eq!(builder.config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_builder_with_timeout() {
        let builder = ProviderClientBuilder::new().with_timeout(Duration::from_secs(3));
        assert_eq!(builder.config.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_builder_with_user_agent() {
        let builder = ProviderClientBuilder::new().with_user_agent("localiday".to_string());
        assert_eq!(builder.config.user_agent, "localiday");
    }

    #[tokio::test]
    async fn test_build_client() {
        assert!(ProviderClientBuilder::new().build().is_ok());
    }
}
