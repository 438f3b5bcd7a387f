//! HMAC-SHA1 request signing for OAuth 1.0a.

use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::error::{config_error, ConfigErrorKind, Error};

type HmacSha1 = Hmac<Sha1>;

const AUTHORIZATION_PREAMBLE: &str = "OAuth";

/// Percent-encode a value using the RFC 3986 unreserved set.
///
/// Only `A-Z a-z 0-9 - . _ ~` pass through unchanged. Providers decode with the
/// same rules, so any deviation invalidates the whole signature.
pub fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Build the signature base string for a request.
///
/// `UPPER(verb) & enc(url) & enc(k1=enc(v1)&k2=enc(v2)...)`, with parameters
/// taken in the order given.
pub fn base_string(verb: &str, url: &str, params: &[(String, String)]) -> String {
    let param_string = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, percent_encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        verb.to_uppercase(),
        percent_encode(url),
        percent_encode(&param_string)
    )
}

/// Sign a base string with the consumer secret and (possibly empty) token secret.
pub fn sign(base_string: &str, consumer_secret: &str, token_secret: &str) -> Result<String, Error> {
    let key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    );

    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|_| config_error(ConfigErrorKind::InvalidSigningKey, "Invalid HMAC key"))?;
    mac.update(base_string.as_bytes());

    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Build the `Authorization` header value from ordered parameters.
pub fn authorization_header(params: &[(String, String)]) -> String {
    let fields = params
        .iter()
        .map(|(key, value)| format!("{}=\"{}\"", key, percent_encode(value)))
        .collect::<Vec<_>>()
        .join(", ");

    format!("{} {}", AUTHORIZATION_PREAMBLE, fields)
}
