//! Normalization of provider profile documents.

use serde::Serialize;
use serde_json::Value;

use crate::error::{malformed_response_error, Error, MalformedResponseErrorKind};

/// Identity reported by an external provider, reduced to the fields a local account needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalIdentity {
    pub id: String,
    pub name: String,
    pub screen_name: String,
    pub email: Option<String>,
}

impl ExternalIdentity {
    /// Build an identity from a provider's user-info JSON.
    pub fn from_profile(profile: &Value) -> Result<Self, Error> {
        let object = profile.as_object().ok_or_else(|| {
            malformed_response_error(
                MalformedResponseErrorKind::NotAnObject,
                "User info is not a JSON object",
            )
        })?;

        let id = ["id", "sub", "id_str"]
            .iter()
            .find_map(|key| object.get(*key).and_then(scalar_to_string))
            .ok_or_else(|| {
                malformed_response_error(
                    MalformedResponseErrorKind::MissingUserId,
                    "User info has no id, sub or id_str",
                )
            })?;

        let text = |key: &str| -> Option<String> {
            object
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        let screen_name = text("screen_name")
            .or_else(|| join_names(text("given_name"), text("family_name")))
            .or_else(|| join_names(text("first_name"), text("last_name")))
            .unwrap_or_default();

        let name = text("name").unwrap_or_else(|| screen_name.clone());

        Ok(Self {
            id,
            name,
            screen_name,
            email: text("email"),
        })
    }

    /// Parse raw user-info bytes and normalize them.
    pub fn from_slice(body: &[u8]) -> Result<Self, Error> {
        let profile: Value = serde_json::from_slice(body)?;
        Self::from_profile(&profile)
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn join_names(first: Option<String>, last: Option<String>) -> Option<String> {
    match (first, last) {
        (Some(first), Some(last)) => Some(format!("{first} {last}")),
        (Some(first), None) => Some(first),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_google_style_profile() {
        let identity = ExternalIdentity::from_profile(&json!({
            "id": "123",
            "given_name": "Ada",
            "family_name": "Lovelace",
            "name": "Ada Lovelace",
            "email": "ada@example.com"
        }))
        .unwrap();

        assert_eq!(identity.id, "123");
        assert_eq!(identity.screen_name, "Ada Lovelace");
        assert_eq!(identity.name, "Ada Lovelace");
        assert_eq!(identity.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn test_numeric_id_without_names() {
        let identity =
            ExternalIdentity::from_profile(&json!({"id": 42, "email": "a@b.com"})).unwrap();
        assert_eq!(identity.id, "42");
        assert_eq!(identity.screen_name, "");
        assert_eq!(identity.name, "");
        assert_eq!(identity.email.as_deref(), Some("a@b.com"));
    }

    #[test]
    fn test_twitter_style_profile() {
        let identity = ExternalIdentity::from_profile(&json!({
            "id_str": "99",
            "screen_name": "ada",
            "name": ""
        }))
        .unwrap();
        assert_eq!(identity.id, "99");
        assert_eq!(identity.screen_name, "ada");
        assert_eq!(identity.name, "ada");
        assert_eq!(identity.email, None);
    }

    #[test]
    fn test_sub_and_first_name_fallback() {
        let identity = ExternalIdentity::from_profile(&json!({
            "sub": "abc",
            "first_name": "Grace"
        }))
        .unwrap();
        assert_eq!(identity.id, "abc");
        assert_eq!(identity.screen_name, "Grace");
        assert_eq!(identity.name, "Grace");
    }

    #[test]
    fn test_missing_id_is_malformed() {
        let err = ExternalIdentity::from_profile(&json!({"name": "x"})).unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::MalformedResponse(MalformedResponseErrorKind::MissingUserId)
        );
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let err = ExternalIdentity::from_slice(b"<html>").unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::MalformedResponse(MalformedResponseErrorKind::Json)
        );
    }
}
