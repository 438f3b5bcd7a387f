//! Canonical OAuth 1.0a protocol parameters.

use std::collections::BTreeMap;

use chrono::Utc;
use rand::Rng;

pub const OAUTH_CALLBACK: &str = "oauth_callback";
pub const OAUTH_CONSUMER_KEY: &str = "oauth_consumer_key";
pub const OAUTH_NONCE: &str = "oauth_nonce";
pub const OAUTH_SIGNATURE: &str = "oauth_signature";
pub const OAUTH_SIGNATURE_METHOD: &str = "oauth_signature_method";
pub const OAUTH_TIMESTAMP: &str = "oauth_timestamp";
pub const OAUTH_TOKEN: &str = "oauth_token";
pub const OAUTH_TOKEN_SECRET: &str = "oauth_token_secret";
pub const OAUTH_VERIFIER: &str = "oauth_verifier";
pub const OAUTH_VERSION: &str = "oauth_version";

pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";
pub const PROTOCOL_VERSION: &str = "1.0";

/// Parameter order for the request-token base string.
pub const REQUEST_TOKEN_BASE_ORDER: &[&str] = &[
    OAUTH_CALLBACK,
    OAUTH_CONSUMER_KEY,
    OAUTH_NONCE,
    OAUTH_SIGNATURE_METHOD,
    OAUTH_TIMESTAMP,
    OAUTH_VERSION,
];

/// Parameter order for the request-token `Authorization` header.
pub const REQUEST_TOKEN_HEADER_ORDER: &[&str] = &[
    OAUTH_NONCE,
    OAUTH_SIGNATURE,
    OAUTH_CALLBACK,
    OAUTH_CONSUMER_KEY,
    OAUTH_TIMESTAMP,
    OAUTH_SIGNATURE_METHOD,
    OAUTH_VERSION,
];

/// Parameter order for the access-token base string.
pub const ACCESS_TOKEN_BASE_ORDER: &[&str] = &[
    OAUTH_CONSUMER_KEY,
    OAUTH_NONCE,
    OAUTH_SIGNATURE_METHOD,
    OAUTH_TIMESTAMP,
    OAUTH_TOKEN,
    OAUTH_VERIFIER,
    OAUTH_VERSION,
];

/// Parameter order for the access-token `Authorization` header.
pub const ACCESS_TOKEN_HEADER_ORDER: &[&str] = &[
    OAUTH_VERIFIER,
    OAUTH_NONCE,
    OAUTH_SIGNATURE,
    OAUTH_TOKEN,
    OAUTH_CONSUMER_KEY,
    OAUTH_TIMESTAMP,
    OAUTH_SIGNATURE_METHOD,
    OAUTH_VERSION,
];

/// Parameter order for the user-info base string.
pub const USER_INFO_BASE_ORDER: &[&str] = &[
    OAUTH_CONSUMER_KEY,
    OAUTH_NONCE,
    OAUTH_SIGNATURE_METHOD,
    OAUTH_TIMESTAMP,
    OAUTH_TOKEN,
    OAUTH_VERSION,
];

/// Parameter order for the user-info `Authorization` header.
pub const USER_INFO_HEADER_ORDER: &[&str] = &[
    OAUTH_CONSUMER_KEY,
    OAUTH_NONCE,
    OAUTH_SIGNATURE,
    OAUTH_SIGNATURE_METHOD,
    OAUTH_TIMESTAMP,
    OAUTH_TOKEN,
    OAUTH_VERSION,
];

/// The OAuth 1.0a parameter set for one signed request.
#[derive(Debug, Clone, PartialEq)]
pub struct OAuthParams(BTreeMap<&'static str, String>);

impl OAuthParams {
    /// Build the parameter set with a fresh nonce and the current timestamp.
    ///
    /// Token, secret and verifier are passed as empty strings for legs where
    /// they do not apply yet.
    pub fn build(
        token: &str,
        token_secret: &str,
        verifier: &str,
        consumer_key: &str,
        redirect_url: &str,
    ) -> Self {
        let timestamp = Utc::now().timestamp().max(0) as u64;
        Self::build_at(
            timestamp,
            generate_nonce(timestamp),
            token,
            token_secret,
            verifier,
            consumer_key,
            redirect_url,
        )
    }

    /// Build the parameter set with an explicit timestamp and nonce.
    pub fn build_at(
        timestamp: u64,
        nonce: String,
        token: &str,
        token_secret: &str,
        verifier: &str,
        consumer_key: &str,
        redirect_url: &str,
    ) -> Self {
        let mut params = BTreeMap::new();
        params.insert(OAUTH_CALLBACK, redirect_url.to_string());
        params.insert(OAUTH_CONSUMER_KEY, consumer_key.to_string());
        params.insert(OAUTH_NONCE, nonce);
        params.insert(OAUTH_SIGNATURE_METHOD, SIGNATURE_METHOD.to_string());
        params.insert(OAUTH_TIMESTAMP, timestamp.to_string());
        params.insert(OAUTH_VERSION, PROTOCOL_VERSION.to_string());
        params.insert(OAUTH_TOKEN, token.to_string());
        params.insert(OAUTH_TOKEN_SECRET, token_secret.to_string());
        params.insert(OAUTH_VERIFIER, verifier.to_string());
        Self(params)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Record the computed signature so it can be projected into the header.
    pub fn set_signature(&mut self, signature: String) {
        self.0.insert(OAUTH_SIGNATURE, signature);
    }

    /// Project the parameters into `(key, value)` pairs following `key_order`.
    ///
    /// Keys absent from the set are skipped; nothing outside `key_order` is emitted.
    pub fn to_ordered_list(&self, key_order: &[&str]) -> Vec<(String, String)> {
        key_order
            .iter()
            .filter_map(|key| {
                self.0
                    .get(*key)
                    .map(|value| (key.to_string(), value.clone()))
            })
            .collect()
    }
}

/// Nonce made of the Unix timestamp followed by one random decimal digit.
///
/// Kept for compatibility with existing provider registrations; this is not a
/// cryptographic nonce.
pub fn generate_nonce(timestamp: u64) -> String {
    let digit: u8 = rand::thread_rng().gen_range(0..10);
    format!("{}{}", timestamp, digit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_params() -> OAuthParams {
        OAuthParams::build_at(
            1_400_000_000,
            "14000000007".to_string(),
            "T1",
            "S1",
            "V1",
            "consumer",
            "http://localhost:4000/oauth/callback/twitter",
        )
    }

    #[test]
    fn test_build_populates_fixed_keys() {
        let params = fixed_params();
        assert_eq!(params.get(OAUTH_SIGNATURE_METHOD), Some("HMAC-SHA1"));
        assert_eq!(params.get(OAUTH_VERSION), Some("1.0"));
        assert_eq!(params.get(OAUTH_TIMESTAMP), Some("1400000000"));
        assert_eq!(params.get(OAUTH_NONCE), Some("14000000007"));
        assert_eq!(params.get(OAUTH_TOKEN), Some("T1"));
        assert_eq!(params.get(OAUTH_TOKEN_SECRET), Some("S1"));
        assert_eq!(params.get(OAUTH_VERIFIER), Some("V1"));
        assert_eq!(params.get(OAUTH_SIGNATURE), None);
    }

    #[test]
    fn test_build_uses_empty_strings_for_unused_legs() {
        let params = OAuthParams::build("", "", "", "consumer", "http://cb");
        assert_eq!(params.get(OAUTH_TOKEN), Some(""));
        assert_eq!(params.get(OAUTH_VERIFIER), Some(""));
        assert_eq!(params.get(OAUTH_CONSUMER_KEY), Some("consumer"));
    }

    #[test]
    fn test_nonce_is_timestamp_plus_one_digit() {
        let nonce = generate_nonce(1_400_000_000);
        assert_eq!(nonce.len(), 11);
        assert!(nonce.starts_with("1400000000"));
        assert!(nonce.chars().last().unwrap().is_ascii_digit());
    }

    #[test]
    fn test_to_ordered_list_follows_key_order() {
        let params = fixed_params();
        let list = params.to_ordered_list(REQUEST_TOKEN_HEADER_ORDER);
        let keys: Vec<&str> = list.iter().map(|(k, _)| k.as_str()).collect();
        // No signature has been set yet, so it is skipped.
        assert_eq!(
            keys,
            vec![
                OAUTH_NONCE,
                OAUTH_CALLBACK,
                OAUTH_CONSUMER_KEY,
                OAUTH_TIMESTAMP,
                OAUTH_SIGNATURE_METHOD,
                OAUTH_VERSION
            ]
        );
    }

    #[test]
    fn test_to_ordered_list_omits_unknown_keys() {
        let params = fixed_params();
        let list = params.to_ordered_list(&["oauth_body_hash", OAUTH_TOKEN, "realm"]);
        assert_eq!(list, vec![(OAUTH_TOKEN.to_string(), "T1".to_string())]);
    }

    #[test]
    fn test_signature_included_after_set() {
        let mut params = fixed_params();
        params.set_signature("sig=".to_string());
        let list = params.to_ordered_list(ACCESS_TOKEN_HEADER_ORDER);
        assert_eq!(list[2], (OAUTH_SIGNATURE.to_string(), "sig=".to_string()));
        assert_eq!(list.len(), ACCESS_TOKEN_HEADER_ORDER.len());
    }
}
