//! OAuth 2.0 authorization-code legs.

use log::*;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::error::{
    malformed_response_error, upstream_error, Error, MalformedResponseErrorKind, UpstreamErrorKind,
};
use crate::provider::ProviderConfig;

/// Build the authorization URL the browser is redirected to.
pub fn authorization_url(provider: &ProviderConfig, scopes: &[String], state: &str) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    query
        .append_pair("client_id", &provider.client_id)
        .append_pair("redirect_uri", &provider.redirect_url)
        .append_pair("response_type", "code");
    if !scopes.is_empty() {
        query.append_pair("scope", &scopes.join(" "));
    }
    query.append_pair("state", state);

    let separator = if provider.auth_url.contains('?') {
        '&'
    } else {
        '?'
    };
    format!("{}{}{}", provider.auth_url, separator, query.finish())
}

/// Trade an authorization code for an access token.
pub async fn exchange_code(
    http: &Client,
    provider: &ProviderConfig,
    code: &str,
) -> Result<SecretString, Error> {
    let params = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", provider.redirect_url.as_str()),
        ("client_id", provider.client_id.as_str()),
        ("client_secret", provider.client_secret.expose_secret().as_str()),
    ];

    debug!("Exchanging {} authorization code", provider.name);
    let response = http
        .post(&provider.token_url)
        .header(ACCEPT, "application/json")
        .form(&params)
        .send()
        .await?;

    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_lowercase();
    let body = response.text().await?;

    if !status.is_success() {
        warn!(
            "{} token endpoint returned {status}: {body}",
            provider.name
        );
        return Err(upstream_error(
            UpstreamErrorKind::Status(status.as_u16()),
            &format!("Token endpoint returned {status}"),
        ));
    }

    let access_token = if content_type.contains("application/x-www-form-urlencoded")
        || content_type.starts_with("text/")
    {
        url::form_urlencoded::parse(body.as_bytes())
            .find(|(key, _)| key == "access_token")
            .map(|(_, value)| value.into_owned())
    } else {
        let json: Value = serde_json::from_str(&body)?;
        json.get("access_token")
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    access_token
        .filter(|token| !token.is_empty())
        .map(SecretString::new)
        .ok_or_else(|| {
            malformed_response_error(
                MalformedResponseErrorKind::MissingAccessToken,
                "Token response did not contain access_token",
            )
        })
}

/// Fetch the user-info document with the bearer token. Returns the raw body.
pub async fn fetch_user_info(
    http: &Client,
    provider: &ProviderConfig,
    access_token: &SecretString,
) -> Result<Vec<u8>, Error> {
    let response = http
        .get(&provider.user_info_url)
        .bearer_auth(access_token.expose_secret())
        .header(ACCEPT, "application/json")
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        warn!("{} user info returned {status}", provider.name);
        return Err(upstream_error(
            UpstreamErrorKind::Status(status.as_u16()),
            &format!("User info returned {status}"),
        ));
    }

    Ok(response.bytes().await?.to_vec())
}
