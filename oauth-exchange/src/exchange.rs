//! Token exchange client driving both protocol versions end to end.

use std::sync::Arc;

use log::*;
use secrecy::SecretString;
use serde::Deserialize;

use crate::error::{
    invalid_request_error, invalid_state_error, upstream_error, Error, UpstreamErrorKind,
};
use crate::flow::{FlowAttempt, FlowStage};
use crate::oauth1;
use crate::oauth2;
use crate::profile::ExternalIdentity;
use crate::provider::{ProviderConfig, ProviderRegistry, Protocol};
use crate::state::{generate_state_key, PendingStateStore};

/// Query parameters a provider may send to the callback.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CallbackParams {
    pub state: Option<String>,
    pub code: Option<String>,
    pub oauth_token: Option<String>,
    pub oauth_verifier: Option<String>,
    pub error: Option<String>,
}

impl CallbackParams {
    /// The correlation key: `state` when present, else the 1.0a `oauth_token`.
    pub fn correlation_key(&self) -> Option<&str> {
        non_empty(&self.state).or_else(|| non_empty(&self.oauth_token))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Result of a finished exchange, ready for the session issuer.
#[derive(Debug)]
pub struct CompletedExchange {
    pub provider: Arc<ProviderConfig>,
    pub identity: ExternalIdentity,
    /// Access token granted by the provider.
    pub credential: SecretString,
    pub attempt: FlowAttempt,
}

/// Runs login flows against the configured providers.
#[derive(Clone)]
pub struct TokenExchangeClient {
    registry: Arc<ProviderRegistry>,
    pending: PendingStateStore,
    http: reqwest::Client,
}

impl TokenExchangeClient {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        pending: PendingStateStore,
        http: reqwest::Client,
    ) -> Self {
        Self {
            registry,
            pending,
            http,
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn pending(&self) -> &PendingStateStore {
        &self.pending
    }

    /// Start a flow for `provider` and return the URL to send the browser to,
    /// along with the attempt that the callback must present again.
    ///
    /// For OAuth 1.0a this performs the signed request-token leg.
    pub async fn generate_redirect_url(
        &self,
        provider: Arc<ProviderConfig>,
    ) -> Result<(String, FlowAttempt), Error> {
        match &provider.protocol {
            Protocol::OAuth2 { scopes } => {
                let state = generate_state_key();
                let url = oauth2::authorization_url(&provider, scopes, &state);
                let mut attempt = FlowAttempt::new(state, provider.clone());
                attempt.advance(FlowStage::AwaitingUserAuthorization);
                Ok((url, attempt))
            }
            Protocol::OAuth1 {
                request_token_url,
                request_token_verb,
            } => {
                let request_token = oauth1::client::fetch_request_token(
                    &self.http,
                    &provider,
                    request_token_url,
                    request_token_verb,
                )
                .await?;

                let separator = if provider.auth_url.contains('?') {
                    '&'
                } else {
                    '?'
                };
                let url = format!(
                    "{}{}oauth_token={}",
                    provider.auth_url,
                    separator,
                    oauth1::signature::percent_encode(&request_token.token)
                );

                let mut attempt = FlowAttempt::new(request_token.token, provider.clone());
                attempt.request_token_secret = Some(request_token.secret);
                attempt.advance(FlowStage::RequestTokenFetched);
                attempt.advance(FlowStage::AwaitingUserAuthorization);
                Ok((url, attempt))
            }
        }
    }

    /// Begin a login with the named provider and register the pending attempt.
    pub async fn begin(&self, provider_name: &str) -> Result<String, Error> {
        let provider = self.registry.get(provider_name)?;
        let (url, attempt) = self.generate_redirect_url(provider).await?;

        info!(
            "Redirecting to {} for authorization ({})",
            attempt.provider.name, attempt.key
        );
        self.pending.put(attempt)?;
        Ok(url)
    }

    /// Finish a login from the provider's callback parameters.
    ///
    /// The pending attempt is consumed before any upstream call, so a key can
    /// be presented once only.
    pub async fn complete_exchange(
        &self,
        provider_name: &str,
        callback: &CallbackParams,
    ) -> Result<CompletedExchange, Error> {
        let provider = self.registry.get(provider_name)?;

        let key = callback.correlation_key().ok_or_else(|| {
            invalid_request_error("Callback carried neither state nor oauth_token")
        })?;

        let mut attempt = self
            .pending
            .take_and_remove(key)
            .ok_or_else(|| invalid_state_error(key))?;

        if attempt.provider.name != provider.name {
            warn!(
                "Attempt {key} belongs to {} but arrived on the {} callback",
                attempt.provider.name, provider.name
            );
            return Err(invalid_state_error(key));
        }

        if let Some(code) = non_empty(&callback.error) {
            warn!("{} rejected authorization: {code}", provider.name);
            attempt.fail(code);
            return Err(upstream_error(
                UpstreamErrorKind::Rejected(code.to_string()),
                &format!("{} returned error {code}", provider.name),
            ));
        }

        let result = match &provider.protocol {
            Protocol::OAuth2 { .. } => self.complete_oauth2(&provider, &mut attempt, callback).await,
            Protocol::OAuth1 {
                request_token_verb, ..
            } => {
                self.complete_oauth1(&provider, &mut attempt, request_token_verb, callback)
                    .await
            }
        };

        match result {
            Ok((identity, credential)) => {
                attempt.advance(FlowStage::IdentityFetched);
                info!(
                    "{} identified external user {}",
                    provider.name, identity.id
                );
                Ok(CompletedExchange {
                    provider,
                    identity,
                    credential,
                    attempt,
                })
            }
            Err(err) => {
                attempt.fail(err.to_string());
                warn!("{} exchange {} failed: {err}", provider.name, attempt.key);
                Err(err)
            }
        }
    }

    async fn complete_oauth2(
        &self,
        provider: &ProviderConfig,
        attempt: &mut FlowAttempt,
        callback: &CallbackParams,
    ) -> Result<(ExternalIdentity, SecretString), Error> {
        let code = non_empty(&callback.code).ok_or_else(|| {
            upstream_error(
                UpstreamErrorKind::MissingAuthorizationCode,
                "Callback did not include an authorization code",
            )
        })?;
        attempt.advance(FlowStage::CodeReceived);

        let access_token = oauth2::exchange_code(&self.http, provider, code).await?;
        let body = oauth2::fetch_user_info(&self.http, provider, &access_token).await?;
        let identity = ExternalIdentity::from_slice(&body)?;

        Ok((identity, access_token))
    }

    async fn complete_oauth1(
        &self,
        provider: &ProviderConfig,
        attempt: &mut FlowAttempt,
        verb: &reqwest::Method,
        callback: &CallbackParams,
    ) -> Result<(ExternalIdentity, SecretString), Error> {
        let request_secret = attempt
            .request_token_secret
            .take()
            .unwrap_or_else(|| SecretString::new(String::new()));
        let verifier = non_empty(&callback.oauth_verifier).unwrap_or_default();

        let access = oauth1::client::fetch_access_token(
            &self.http,
            provider,
            verb,
            &attempt.key,
            &request_secret,
            verifier,
        )
        .await?;
        attempt.advance(FlowStage::AccessTokenFetched);

        let body = oauth1::client::fetch_user_info(&self.http, provider, &access).await?;
        let identity = ExternalIdentity::from_slice(&body)?;

        Ok((identity, SecretString::new(access.token)))
    }
}
