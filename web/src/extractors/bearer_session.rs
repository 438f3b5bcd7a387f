use crate::error::{Error, WebErrorKind};
use axum::http::{header::AUTHORIZATION, HeaderMap};
use log::*;

const BEARER_PREFIX: &str = "Bearer ";

/// Reads the session id from an `Authorization: Bearer {sessionID}` header.
pub(crate) fn bearer_session_id(headers: &HeaderMap) -> Result<String, Error> {
    let session_id = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            value
                .get(..BEARER_PREFIX.len())
                .filter(|prefix| prefix.eq_ignore_ascii_case(BEARER_PREFIX))
                .map(|_| value[BEARER_PREFIX.len()..].trim())
        })
        .filter(|session_id| !session_id.is_empty());

    match session_id {
        Some(session_id) => Ok(session_id.to_string()),
        None => {
            warn!("There was no authorization in the request.");
            Err(Error::Web(WebErrorKind::Auth))
        }
    }
}
