//! Error types for the `oauth-exchange` crate.
//!
//! Follows the same pattern as domain::error with a root Error struct and error kind enums.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for oauth-exchange crate.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in oauth-exchange.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    /// Provider configuration is missing or invalid. Fatal at startup.
    Config(ConfigErrorKind),
    /// The requested provider is not registered.
    UnknownProvider,
    /// A callback carried neither a state value nor an OAuth 1.0a token.
    InvalidRequest,
    /// A callback correlation key is not pending (expired, replayed or forged).
    InvalidState,
    /// A provider call failed or returned a non-success response.
    Upstream(UpstreamErrorKind),
    /// A provider returned a body that could not be decoded.
    MalformedResponse(MalformedResponseErrorKind),
    /// The pending-state store refused an attempt.
    State(StateErrorKind),
}

/// Errors from loading provider configuration.
#[derive(Debug, PartialEq)]
pub enum ConfigErrorKind {
    Read,
    Parse,
    MissingField,
    MissingCredential,
    InvalidVersion,
    InvalidVerb,
    InvalidSigningKey,
}

/// Errors from talking to a provider.
#[derive(Debug, PartialEq)]
pub enum UpstreamErrorKind {
    BuilderFailed,
    Network,
    Status(u16),
    /// The provider reported an error code on the callback.
    Rejected(String),
    MissingAuthorizationCode,
    InvalidBody,
}

/// Errors from the pending-state store.
#[derive(Debug, PartialEq)]
pub enum StateErrorKind {
    DuplicateKey,
}

/// Errors from decoding provider payloads.
#[derive(Debug, PartialEq)]
pub enum MalformedResponseErrorKind {
    Json,
    NotAnObject,
    MissingUserId,
    MissingAccessToken,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::Config(kind) => write!(f, "Configuration error: {:?}", kind)?,
            ErrorKind::UnknownProvider => write!(f, "Unknown OAuth provider")?,
            ErrorKind::InvalidRequest => write!(f, "Invalid OAuth callback request")?,
            ErrorKind::InvalidState => write!(f, "OAuth state not recognized")?,
            ErrorKind::Upstream(kind) => write!(f, "Upstream provider error: {:?}", kind)?,
            ErrorKind::MalformedResponse(kind) => {
                write!(f, "Malformed provider response: {:?}", kind)?
            }
            ErrorKind::State(kind) => write!(f, "Pending state error: {:?}", kind)?,
        }
        if let Some(source) = &self.source {
            write!(f, " ({})", source)?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let error_kind = if err.is_builder() {
            ErrorKind::Upstream(UpstreamErrorKind::BuilderFailed)
        } else if let Some(status) = err.status() {
            ErrorKind::Upstream(UpstreamErrorKind::Status(status.as_u16()))
        } else {
            ErrorKind::Upstream(UpstreamErrorKind::Network)
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Config(ConfigErrorKind::Parse),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::MalformedResponse(MalformedResponseErrorKind::Json),
        }
    }
}

/// Helper function to create configuration errors.
pub fn config_error(kind: ConfigErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Config(kind),
    }
}

/// Helper function to create upstream errors.
pub fn upstream_error(kind: UpstreamErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Upstream(kind),
    }
}

/// Helper function to create malformed response errors.
pub fn malformed_response_error(kind: MalformedResponseErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::MalformedResponse(kind),
    }
}

pub fn state_error(kind: StateErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::State(kind),
    }
}

pub fn unknown_provider_error(name: &str) -> Error {
    Error {
        source: Some(format!("No provider registered under '{name}'").into()),
        error_kind: ErrorKind::UnknownProvider,
    }
}

pub fn invalid_state_error(key: &str) -> Error {
    Error {
        source: Some(format!("State {key} not expected value").into()),
        error_kind: ErrorKind::InvalidState,
    }
}

pub fn invalid_request_error(message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::InvalidRequest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_source_message() {
        let err = config_error(ConfigErrorKind::MissingField, "UserInfoURL");
        assert_eq!(
            err.to_string(),
            "Configuration error: MissingField (UserInfoURL)"
        );
    }

    #[test]
    fn test_helpers_set_error_kind() {
        assert_eq!(
            invalid_state_error("lcldyabc").error_kind,
            ErrorKind::InvalidState
        );
        assert_eq!(
            unknown_provider_error("myspace").error_kind,
            ErrorKind::UnknownProvider
        );
        assert_eq!(
            upstream_error(UpstreamErrorKind::Status(401), "denied").error_kind,
            ErrorKind::Upstream(UpstreamErrorKind::Status(401))
        );
    }

    #[test]
    fn test_json_error_is_malformed_response() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = Error::from(json_err);
        assert_eq!(
            err.error_kind,
            ErrorKind::MalformedResponse(MalformedResponseErrorKind::Json)
        );
        assert!(err.source.is_some());
    }
}
