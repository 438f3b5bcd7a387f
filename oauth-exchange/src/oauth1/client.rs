//! The three signed legs of an OAuth 1.0a login.

use log::*;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, Response};
use secrecy::{ExposeSecret, SecretString};

use super::params::{
    OAuthParams, ACCESS_TOKEN_BASE_ORDER, ACCESS_TOKEN_HEADER_ORDER, OAUTH_TOKEN,
    OAUTH_TOKEN_SECRET, REQUEST_TOKEN_BASE_ORDER, REQUEST_TOKEN_HEADER_ORDER,
    USER_INFO_BASE_ORDER, USER_INFO_HEADER_ORDER,
};
use super::signature::{authorization_header, base_string, sign};
use crate::error::{upstream_error, Error, UpstreamErrorKind};
use crate::provider::ProviderConfig;

/// A token and its secret as returned by a token endpoint.
#[derive(Debug)]
pub struct TokenPair {
    pub token: String,
    pub secret: SecretString,
}

/// Which leg is being signed; selects the parameter orders.
#[derive(Debug, Clone, Copy)]
enum Leg {
    RequestToken,
    AccessToken,
    UserInfo,
}

impl Leg {
    fn orders(self) -> (&'static [&'static str], &'static [&'static str]) {
        match self {
            Leg::RequestToken => (REQUEST_TOKEN_BASE_ORDER, REQUEST_TOKEN_HEADER_ORDER),
            Leg::AccessToken => (ACCESS_TOKEN_BASE_ORDER, ACCESS_TOKEN_HEADER_ORDER),
            Leg::UserInfo => (USER_INFO_BASE_ORDER, USER_INFO_HEADER_ORDER),
        }
    }
}

/// Sign `params` for `verb url` and return the `Authorization` header value.
fn signed_header(
    leg: Leg,
    mut params: OAuthParams,
    verb: &Method,
    url: &str,
    consumer_secret: &str,
    token_secret: &str,
) -> Result<String, Error> {
    let (base_order, header_order) = leg.orders();

    let base = base_string(verb.as_str(), url, &params.to_ordered_list(base_order));
    trace!("OAuth 1.0a {leg:?} base string: {base}");

    let signature = sign(&base, consumer_secret, token_secret)?;
    params.set_signature(signature);

    Ok(authorization_header(&params.to_ordered_list(header_order)))
}

/// Access-token leg header, keyed by the consumer secret and the request-token secret.
fn access_token_header(
    provider: &ProviderConfig,
    verb: &Method,
    params: OAuthParams,
    request_token_secret: &SecretString,
) -> Result<String, Error> {
    signed_header(
        Leg::AccessToken,
        params,
        verb,
        &provider.token_url,
        provider.client_secret.expose_secret(),
        request_token_secret.expose_secret(),
    )
}

/// User-info leg header, keyed by the consumer secret and the access-token secret.
fn user_info_header(
    provider: &ProviderConfig,
    params: OAuthParams,
    access: &TokenPair,
) -> Result<String, Error> {
    signed_header(
        Leg::UserInfo,
        params,
        &Method::GET,
        &provider.user_info_url,
        provider.client_secret.expose_secret(),
        access.secret.expose_secret(),
    )
}

/// Fail on any non-2xx status, keeping the body for the log.
async fn ensure_success(response: Response, leg: &str) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!("OAuth 1.0a {leg} failed with status {status}: {body}");
    Err(upstream_error(
        UpstreamErrorKind::Status(status.as_u16()),
        &format!("{leg} returned {status}"),
    ))
}

/// Parse a form-encoded token response into a token pair.
pub fn parse_token_response(body: &str) -> Result<TokenPair, Error> {
    let mut token = None;
    let mut secret = None;
    for (key, value) in url::form_urlencoded::parse(body.as_bytes()) {
        match key.as_ref() {
            OAUTH_TOKEN => token = Some(value.into_owned()),
            OAUTH_TOKEN_SECRET => secret = Some(value.into_owned()),
            _ => {}
        }
    }

    match token.filter(|token| !token.is_empty()) {
        Some(token) => Ok(TokenPair {
            token,
            secret: SecretString::new(secret.unwrap_or_default()),
        }),
        None => Err(upstream_error(
            UpstreamErrorKind::InvalidBody,
            "Token response did not contain oauth_token",
        )),
    }
}

/// Leg 1: obtain a request token using the configured verb.
pub async fn fetch_request_token(
    http: &Client,
    provider: &ProviderConfig,
    request_token_url: &str,
    verb: &Method,
) -> Result<TokenPair, Error> {
    let params = OAuthParams::build("", "", "", &provider.client_id, &provider.redirect_url);
    let header = signed_header(
        Leg::RequestToken,
        params,
        verb,
        request_token_url,
        provider.client_secret.expose_secret(),
        "",
    )?;

    debug!("Requesting OAuth 1.0a request token from {request_token_url}");
    let response = http
        .request(verb.clone(), request_token_url)
        .header(AUTHORIZATION, header)
        .send()
        .await?;
    let response = ensure_success(response, "request token").await?;

    parse_token_response(&response.text().await?)
}

/// Leg 2: trade the authorized request token and verifier for an access token.
pub async fn fetch_access_token(
    http: &Client,
    provider: &ProviderConfig,
    verb: &Method,
    request_token: &str,
    request_token_secret: &SecretString,
    verifier: &str,
) -> Result<TokenPair, Error> {
    let params = OAuthParams::build(
        request_token,
        request_token_secret.expose_secret(),
        verifier,
        &provider.client_id,
        &provider.redirect_url,
    );
    let header = access_token_header(provider, verb, params, request_token_secret)?;

    debug!("Requesting OAuth 1.0a access token from {}", provider.token_url);
    let response = http
        .request(verb.clone(), &provider.token_url)
        .header(AUTHORIZATION, header)
        .send()
        .await?;
    let response = ensure_success(response, "access token").await?;

    parse_token_response(&response.text().await?)
}

/// Leg 3: signed GET of the user-info resource. Returns the raw body.
///
/// Query parameters already present in the user-info URL are not folded into
/// the base string.
pub async fn fetch_user_info(
    http: &Client,
    provider: &ProviderConfig,
    access: &TokenPair,
) -> Result<Vec<u8>, Error> {
    let params = OAuthParams::build(
        &access.token,
        access.secret.expose_secret(),
        "",
        &provider.client_id,
        &provider.redirect_url,
    );
    let header = user_info_header(provider, params, access)?;

    let response = http
        .get(&provider.user_info_url)
        .header(AUTHORIZATION, header)
        .send()
        .await?;
    let response = ensure_success(response, "user info").await?;

    Ok(response.bytes().await?.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::flow::tests::provider;
    use crate::oauth1::signature::percent_encode;
    use crate::provider::Protocol;
    use mockito::Matcher;

    fn twitter(server_url: &str) -> ProviderConfig {
        let shared = provider(Protocol::OAuth1 {
            request_token_url: format!("{server_url}/oauth/request_token"),
            request_token_verb: Method::POST,
        });
        ProviderConfig {
            name: shared.name.clone(),
            auth_url: format!("{server_url}/oauth/authenticate"),
            token_url: format!("{server_url}/oauth/access_token"),
            user_info_url: format!("{server_url}/account/verify_credentials.json"),
            protocol: shared.protocol.clone(),
            client_id: "consumer".to_string(),
            client_secret: SecretString::new("consumer-secret".to_string()),
            redirect_url: shared.redirect_url.clone(),
        }
    }

    #[test]
    fn test_parse_token_response() {
        let pair = parse_token_response("oauth_token=T1&oauth_token_secret=S1&x=1").unwrap();
        assert_eq!(pair.token, "T1");
        assert_eq!(pair.secret.expose_secret(), "S1");
    }

    #[test]
    fn test_parse_token_response_without_token() {
        let err = parse_token_response("error=denied").unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::Upstream(UpstreamErrorKind::InvalidBody)
        );
    }

    #[test]
    fn test_signed_header_contains_signature_in_header_order() {
        let params = OAuthParams::build_at(
            1_400_000_000,
            "14000000003".to_string(),
            "",
            "",
            "",
            "consumer",
            "http://cb",
        );
        let header = signed_header(
            Leg::RequestToken,
            params,
            &Method::POST,
            "https://api.example.com/request_token",
            "secret",
            "",
        )
        .unwrap();

        assert!(header.starts_with("OAuth oauth_nonce=\"14000000003\", oauth_signature=\""));
        assert!(header.ends_with("oauth_signature_method=\"HMAC-SHA1\", oauth_version=\"1.0\""));
    }

    fn header_signature(header: &str) -> &str {
        header
            .split("oauth_signature=\"")
            .nth(1)
            .and_then(|rest| rest.split('"').next())
            .unwrap()
    }

    fn expected_signature(
        params: &OAuthParams,
        base_order: &[&str],
        verb: &str,
        url: &str,
        token_secret: &str,
    ) -> String {
        let base = base_string(verb, url, &params.to_ordered_list(base_order));
        percent_encode(&sign(&base, "consumer-secret", token_secret).unwrap())
    }

    #[test]
    fn test_access_token_header_is_keyed_with_request_token_secret() {
        let provider = twitter("https://api.example.com");
        let params = OAuthParams::build_at(
            1_400_000_000,
            "14000000007".to_string(),
            "RT",
            "RS",
            "V",
            "consumer",
            "http://cb",
        );

        let header = access_token_header(
            &provider,
            &Method::POST,
            params.clone(),
            &SecretString::new("RS".to_string()),
        )
        .unwrap();

        let signature = header_signature(&header);
        let url = "https://api.example.com/oauth/access_token";
        assert_eq!(
            signature,
            expected_signature(&params, ACCESS_TOKEN_BASE_ORDER, "POST", url, "RS")
        );
        assert_ne!(
            signature,
            expected_signature(&params, ACCESS_TOKEN_BASE_ORDER, "POST", url, "")
        );
    }

    #[test]
    fn test_user_info_header_is_keyed_with_access_token_secret() {
        let provider = twitter("https://api.example.com");
        let access = TokenPair {
            token: "AT".to_string(),
            secret: SecretString::new("AS".to_string()),
        };
        let params = OAuthParams::build_at(
            1_400_000_000,
            "14000000002".to_string(),
            "AT",
            "AS",
            "",
            "consumer",
            "http://cb",
        );

        let header = user_info_header(&provider, params.clone(), &access).unwrap();

        let signature = header_signature(&header);
        let url = "https://api.example.com/account/verify_credentials.json";
        assert_eq!(
            signature,
            expected_signature(&params, USER_INFO_BASE_ORDER, "GET", url, "AS")
        );
        assert_ne!(
            signature,
            expected_signature(&params, USER_INFO_BASE_ORDER, "GET", url, "")
        );
    }

    #[tokio::test]
    async fn test_fetch_request_token_uses_configured_verb() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth/request_token")
            .match_header(
                "authorization",
                Matcher::Regex(r#"^OAuth oauth_nonce="\d+", oauth_signature=""#.to_string()),
            )
            .with_status(200)
            .with_body("oauth_token=RT&oauth_token_secret=RS&oauth_callback_confirmed=true")
            .create_async()
            .await;

        let provider = twitter(&server.url());
        let pair = fetch_request_token(
            &Client::new(),
            &provider,
            &format!("{}/oauth/request_token", server.url()),
            &Method::POST,
        )
        .await
        .unwrap();

        mock.assert_async().await;
        assert_eq!(pair.token, "RT");
        assert_eq!(pair.secret.expose_secret(), "RS");
    }

    #[tokio::test]
    async fn test_fetch_access_token_non_success_is_upstream_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/oauth/access_token")
            .with_status(401)
            .with_body("Invalid verifier")
            .create_async()
            .await;

        let provider = twitter(&server.url());
        let err = fetch_access_token(
            &Client::new(),
            &provider,
            &Method::POST,
            "RT",
            &SecretString::new("RS".to_string()),
            "V",
        )
        .await
        .unwrap_err();

        assert_eq!(
            err.error_kind,
            ErrorKind::Upstream(UpstreamErrorKind::Status(401))
        );
    }

    #[tokio::test]
    async fn test_fetch_user_info_is_signed_get() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/account/verify_credentials.json")
            .match_header(
                "authorization",
                Matcher::Regex(r#"oauth_token="AT""#.to_string()),
            )
            .with_status(200)
            .with_body(r#"{"id_str":"99","screen_name":"ada"}"#)
            .create_async()
            .await;

        let provider = twitter(&server.url());
        let access = TokenPair {
            token: "AT".to_string(),
            secret: SecretString::new("AS".to_string()),
        };
        let body = fetch_user_info(&Client::new(), &provider, &access)
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(String::from_utf8(body).unwrap().contains("\"99\""));
    }
}
