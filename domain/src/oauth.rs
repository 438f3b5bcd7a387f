//! Third-party sign-in: hands a completed provider exchange to the session issuer.

use crate::accounts::{Accounts, UserSession};
use crate::error::Error;
use log::*;
use oauth_exchange::{CallbackParams, FlowStage, TokenExchangeClient};

/// Begin a sign-in with `provider` and return the URL to redirect the browser to.
pub async fn begin_login(client: &TokenExchangeClient, provider: &str) -> Result<String, Error> {
    Ok(client.begin(provider).await?)
}

/// Finish a sign-in from the provider callback and issue a local session.
pub async fn complete_login(
    client: &TokenExchangeClient,
    accounts: &Accounts,
    provider: &str,
    callback: &CallbackParams,
) -> Result<UserSession, Error> {
    let mut completed = client.complete_exchange(provider, callback).await?;

    match accounts.create_session_for_oauth_user(&completed.identity, &completed.provider.name) {
        Ok(user_session) => {
            completed.attempt.advance(FlowStage::SessionCreated);
            info!(
                "Created session for {} user {}",
                completed.provider.name, user_session.user.username
            );
            Ok(user_session)
        }
        Err(err) => {
            completed.attempt.fail(err.to_string());
            warn!(
                "Could not create session for {} user {}: {err}",
                completed.provider.name, completed.identity.id
            );
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AuthorizationErrorKind, DomainErrorKind, ExternalErrorKind};
    use oauth_exchange::{PendingStateStore, ProviderRegistry};
    use std::sync::Arc;

    fn client(server_url: &str) -> TokenExchangeClient {
        let yaml = format!(
            "GOOGLE:\n  AuthURL: {server_url}/auth\n  TokenURL: {server_url}/token\n  UserInfoURL: {server_url}/me\n  OAuthVersion: \"2.0\"\n"
        );
        let registry =
            ProviderRegistry::from_yaml(&yaml, "http://localhost:4000", |_| Some("x".to_string()))
                .unwrap();
        TokenExchangeClient::new(
            Arc::new(registry),
            PendingStateStore::new(),
            reqwest::Client::new(),
        )
    }

    #[tokio::test]
    async fn test_complete_login_issues_session() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"AT"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/me")
            .with_status(200)
            .with_body(r#"{"id":"123","given_name":"Ada","family_name":"Lovelace"}"#)
            .create_async()
            .await;

        let client = client(&server.url());
        let accounts = Accounts::default();
        accounts.bootstrap("admin").unwrap();

        let url = begin_login(&client, "google").await.unwrap();
        let state = url.split("state=").nth(1).unwrap().to_string();
        let callback = CallbackParams {
            state: Some(state),
            code: Some("C".to_string()),
            ..Default::default()
        };

        let user_session = complete_login(&client, &accounts, "google", &callback)
            .await
            .unwrap();
        assert_eq!(user_session.user.username, "123");
        assert_eq!(user_session.user.nick_name, "Ada Lovelace");
        assert!(accounts.validate(&user_session.session.session_id).is_ok());
    }

    #[tokio::test]
    async fn test_complete_login_with_unknown_state() {
        let client = client("http://127.0.0.1:9");
        let accounts = Accounts::default();
        let callback = CallbackParams {
            state: Some("lcldyForged".to_string()),
            ..Default::default()
        };

        let err = complete_login(&client, &accounts, "google", &callback)
            .await
            .unwrap_err();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Authorization(
                AuthorizationErrorKind::InvalidState
            ))
        );
    }
}
