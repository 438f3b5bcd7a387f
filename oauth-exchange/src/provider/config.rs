//! Provider configuration with endpoints and credentials.

use std::fmt;
use std::str::FromStr;

use reqwest::Method;
use secrecy::SecretString;
use serde::Deserialize;

use crate::error::{config_error, ConfigErrorKind, Error};

/// OAuth protocol version spoken by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthVersion {
    /// OAuth 1.0a, three-legged with signed requests.
    V1,
    /// OAuth 2.0 authorization-code flow.
    V2,
}

impl OAuthVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthVersion::V1 => "1.0",
            OAuthVersion::V2 => "2.0",
        }
    }
}

impl fmt::Display for OAuthVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OAuthVersion {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "1" | "1.0" | "1.0a" => Ok(OAuthVersion::V1),
            "2" | "2.0" => Ok(OAuthVersion::V2),
            other => Err(config_error(
                ConfigErrorKind::InvalidVersion,
                &format!("OAuthVersion must be \"1.0\" or \"2.0\", got \"{other}\""),
            )),
        }
    }
}

/// Protocol-specific endpoint settings.
#[derive(Debug, Clone, PartialEq)]
pub enum Protocol {
    OAuth1 {
        request_token_url: String,
        request_token_verb: Method,
    },
    OAuth2 {
        /// Requested scopes, in configured order.
        scopes: Vec<String>,
    },
}

/// One external identity provider. Immutable after load.
#[derive(Debug)]
pub struct ProviderConfig {
    /// Lower-case provider name, the registry key.
    pub name: String,
    pub auth_url: String,
    pub token_url: String,
    pub user_info_url: String,
    pub protocol: Protocol,
    pub client_id: String,
    pub client_secret: SecretString,
    /// Callback URL registered with the provider.
    pub redirect_url: String,
}

impl ProviderConfig {
    pub fn version(&self) -> OAuthVersion {
        match self.protocol {
            Protocol::OAuth1 { .. } => OAuthVersion::V1,
            Protocol::OAuth2 { .. } => OAuthVersion::V2,
        }
    }

    /// Upper-case name used for environment credentials and provider roles.
    pub fn env_prefix(&self) -> String {
        self.name.to_uppercase()
    }
}

/// Build the callback URL for a provider under the public host URL.
pub fn callback_url(host_url: &str, provider_name: &str) -> String {
    format!(
        "{}/oauth/callback/{}",
        host_url.trim_end_matches('/'),
        provider_name.to_lowercase()
    )
}

/// `OAuthVersion` may be written as a quoted string or a bare YAML number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum VersionLiteral {
    Text(String),
    Number(f64),
}

impl VersionLiteral {
    fn parse(&self) -> Result<OAuthVersion, Error> {
        match self {
            VersionLiteral::Text(text) => text.parse(),
            VersionLiteral::Number(number) => format!("{number:.1}").parse(),
        }
    }
}

/// A provider entry as written in the configuration file.
#[derive(Debug, Deserialize)]
pub(crate) struct RawProviderEntry {
    #[serde(rename = "AuthURL")]
    pub auth_url: Option<String>,
    #[serde(rename = "TokenURL")]
    pub token_url: Option<String>,
    #[serde(rename = "UserInfoURL")]
    pub user_info_url: Option<String>,
    #[serde(rename = "RequestTokenURL")]
    pub request_token_url: Option<String>,
    #[serde(rename = "RequestTokenVerb")]
    pub request_token_verb: Option<String>,
    #[serde(rename = "Scopes", default)]
    pub scopes: Vec<String>,
    #[serde(rename = "OAuthVersion")]
    pub oauth_version: Option<VersionLiteral>,
}

fn required(value: Option<String>, provider: &str, field: &str) -> Result<String, Error> {
    value.filter(|v| !v.trim().is_empty()).ok_or_else(|| {
        config_error(
            ConfigErrorKind::MissingField,
            &format!("Provider {provider} is missing {field}"),
        )
    })
}

impl RawProviderEntry {
    /// Validate the entry and resolve its credentials.
    pub(crate) fn resolve<F>(
        self,
        name: &str,
        host_url: &str,
        env_lookup: &F,
    ) -> Result<ProviderConfig, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let prefix = name.to_uppercase();

        let version = match &self.oauth_version {
            Some(literal) => literal.parse()?,
            // Entries written before OAuthVersion existed: a request-token URL means 1.0a.
            None if self.request_token_url.is_some() => OAuthVersion::V1,
            None => OAuthVersion::V2,
        };

        let user_info_url = required(self.user_info_url, &prefix, "UserInfoURL")?;
        let auth_url = required(self.auth_url, &prefix, "AuthURL")?;
        let token_url = required(self.token_url, &prefix, "TokenURL")?;

        let protocol = match version {
            OAuthVersion::V1 => {
                let request_token_url =
                    required(self.request_token_url, &prefix, "RequestTokenURL")?;
                let verb = required(self.request_token_verb, &prefix, "RequestTokenVerb")?;
                let request_token_verb =
                    Method::from_bytes(verb.trim().to_uppercase().as_bytes()).map_err(|_| {
                        config_error(
                            ConfigErrorKind::InvalidVerb,
                            &format!("Provider {prefix} has invalid RequestTokenVerb {verb}"),
                        )
                    })?;
                Protocol::OAuth1 {
                    request_token_url,
                    request_token_verb,
                }
            }
            OAuthVersion::V2 => Protocol::OAuth2 {
                scopes: self.scopes,
            },
        };

        let client_id = credential(env_lookup, &format!("{prefix}_CLIENT_ID"))?;
        let client_secret = credential(env_lookup, &format!("{prefix}_CLIENT_SECRET"))?;

        Ok(ProviderConfig {
            name: name.to_lowercase(),
            auth_url,
            token_url,
            user_info_url,
            protocol,
            client_id,
            client_secret: SecretString::new(client_secret),
            redirect_url: callback_url(host_url, name),
        })
    }
}

fn credential<F>(env_lookup: &F, variable: &str) -> Result<String, Error>
where
    F: Fn(&str) -> Option<String>,
{
    env_lookup(variable)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            config_error(
                ConfigErrorKind::MissingCredential,
                &format!("Environment variable {variable} is not set"),
            )
        })
}
