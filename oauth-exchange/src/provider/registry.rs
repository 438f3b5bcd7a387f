//! Registry of configured identity providers.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use log::*;

use super::config::{ProviderConfig, RawProviderEntry};
use crate::error::{config_error, unknown_provider_error, ConfigErrorKind, Error};

/// Holds every configured provider for the lifetime of the process.
///
/// Lookups are case-insensitive on the provider name.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<ProviderConfig>>,
}

impl ProviderRegistry {
    /// Load providers from a YAML file, resolving credentials from the process environment.
    ///
    /// # Arguments
    ///
    /// * `path` - Path of the provider configuration file
    /// * `host_url` - Public base URL of this server, used to build callback URLs
    pub fn load(path: impl AsRef<Path>, host_url: &str) -> Result<Self, Error> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: crate::ErrorKind::Config(ConfigErrorKind::Read),
        })?;

        info!("Loading OAuth providers from {}", path.display());
        Self::from_yaml(&source, host_url, |variable| std::env::var(variable).ok())
    }

    /// Parse providers from YAML, resolving credentials through `env_lookup`.
    pub fn from_yaml<F>(source: &str, host_url: &str, env_lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let entries: BTreeMap<String, RawProviderEntry> = serde_yaml::from_str(source)?;

        let mut providers = Vec::with_capacity(entries.len());
        for (name, entry) in entries {
            let provider = entry.resolve(&name, host_url, &env_lookup)?;
            debug!(
                "Configured OAuth {} provider {} with callback {}",
                provider.version(),
                provider.name,
                provider.redirect_url
            );
            providers.push(provider);
        }

        Self::from_providers(providers)
    }

    /// Build a registry from already resolved providers.
    pub fn from_providers(providers: Vec<ProviderConfig>) -> Result<Self, Error> {
        let mut registry = HashMap::with_capacity(providers.len());
        for provider in providers {
            let key = provider.name.to_lowercase();
            if registry.contains_key(&key) {
                return Err(config_error(
                    ConfigErrorKind::Parse,
                    &format!("Provider {key} is configured more than once"),
                ));
            }
            registry.insert(key, Arc::new(provider));
        }

        Ok(Self {
            providers: registry,
        })
    }

    /// Get a provider by name, ignoring case.
    pub fn get(&self, name: &str) -> Result<Arc<ProviderConfig>, Error> {
        self.providers
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| unknown_provider_error(name))
    }

    /// Registered provider names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::provider::{OAuthVersion, Protocol};
    use reqwest::Method;
    use secrecy::ExposeSecret;

    const CONFIG: &str = r#"
GOOGLE:
  AuthURL: https://accounts.google.com/o/oauth2/auth
  TokenURL: https://accounts.google.com/o/oauth2/token
  UserInfoURL: https://www.googleapis.com/oauth2/v2/userinfo
  OAuthVersion: "2.0"
  Scopes:
    - profile
    - email
TWITTER:
  AuthURL: https://api.twitter.com/oauth/authenticate
  TokenURL: https://api.twitter.com/oauth/access_token
  RequestTokenURL: https://api.twitter.com/oauth/request_token
  RequestTokenVerb: post
  UserInfoURL: https://api.twitter.com/1.1/account/verify_credentials.json
  OAuthVersion: 1.0
"#;

    fn env(variable: &str) -> Option<String> {
        match variable {
            "GOOGLE_CLIENT_ID" => Some("google-id".to_string()),
            "GOOGLE_CLIENT_SECRET" => Some("google-secret".to_string()),
            "TWITTER_CLIENT_ID" => Some("twitter-id".to_string()),
            "TWITTER_CLIENT_SECRET" => Some("twitter-secret".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_from_yaml_loads_both_protocols() {
        let registry = ProviderRegistry::from_yaml(CONFIG, "http://localhost:4000/", env).unwrap();
        assert_eq!(registry.names(), vec!["google", "twitter"]);

        let google = registry.get("google").unwrap();
        assert_eq!(google.version(), OAuthVersion::V2);
        assert_eq!(google.client_id, "google-id");
        assert_eq!(google.client_secret.expose_secret(), "google-secret");
        assert_eq!(
            google.redirect_url,
            "http://localhost:4000/oauth/callback/google"
        );
        assert_eq!(
            google.protocol,
            Protocol::OAuth2 {
                scopes: vec!["profile".to_string(), "email".to_string()]
            }
        );

        let twitter = registry.get("twitter").unwrap();
        assert_eq!(
            twitter.protocol,
            Protocol::OAuth1 {
                request_token_url: "https://api.twitter.com/oauth/request_token".to_string(),
                request_token_verb: Method::POST,
            }
        );
    }

    #[test]
    fn test_get_is_case_insensitive() {
        let registry = ProviderRegistry::from_yaml(CONFIG, "http://localhost:4000", env).unwrap();
        assert_eq!(registry.get("Google").unwrap().name, "google");
        assert_eq!(registry.get("TWITTER").unwrap().name, "twitter");
    }

    #[test]
    fn test_get_unknown_provider() {
        let registry = ProviderRegistry::from_yaml(CONFIG, "http://localhost:4000", env).unwrap();
        let err = registry.get("myspace").unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::UnknownProvider);
    }

    #[test]
    fn test_missing_user_info_url_is_config_error() {
        let yaml = "GITHUB:\n  AuthURL: https://a\n  TokenURL: https://t\n";
        let err = ProviderRegistry::from_yaml(yaml, "http://h", |_| Some("x".to_string()))
            .unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::Config(ConfigErrorKind::MissingField));
    }

    #[test]
    fn test_oauth1_requires_request_token_verb() {
        let yaml = "TWITTER:\n  AuthURL: https://a\n  TokenURL: https://t\n  UserInfoURL: https://u\n  RequestTokenURL: https://r\n  OAuthVersion: \"1.0\"\n";
        let err = ProviderRegistry::from_yaml(yaml, "http://h", |_| Some("x".to_string()))
            .unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::Config(ConfigErrorKind::MissingField));
    }

    #[test]
    fn test_missing_version_with_request_token_url_infers_oauth1() {
        let yaml = "TWITTER:\n  AuthURL: https://a\n  TokenURL: https://t\n  UserInfoURL: https://u\n  RequestTokenURL: https://r\n  RequestTokenVerb: GET\n";
        let registry =
            ProviderRegistry::from_yaml(yaml, "http://h", |_| Some("x".to_string())).unwrap();
        assert_eq!(registry.get("twitter").unwrap().version(), OAuthVersion::V1);
    }

    #[test]
    fn test_missing_credential_is_config_error() {
        let err = ProviderRegistry::from_yaml(CONFIG, "http://h", |variable| {
            (variable != "TWITTER_CLIENT_SECRET").then(|| "x".to_string())
        })
        .unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::Config(ConfigErrorKind::MissingCredential)
        );
    }

    #[test]
    fn test_invalid_version_is_config_error() {
        let yaml = "FOO:\n  AuthURL: https://a\n  TokenURL: https://t\n  UserInfoURL: https://u\n  OAuthVersion: \"3.0\"\n";
        let err = ProviderRegistry::from_yaml(yaml, "http://h", |_| Some("x".to_string()))
            .unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::Config(ConfigErrorKind::InvalidVersion));
    }

    #[test]
    fn test_unreadable_file_is_config_error() {
        let err = ProviderRegistry::load("/nonexistent/oauth_config.yaml", "http://h").unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::Config(ConfigErrorKind::Read));
    }
}
