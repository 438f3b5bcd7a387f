//! Error types for the `domain` layer.
use oauth_exchange::error::{Error as OAuthExchangeError, ErrorKind as OAuthExchangeErrorKind};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field is used to hold the original error that caused
/// the domain error. The intent is to translate errors between layers while maintaining
/// layer boundaries. Ex. `domain` is dependent on `oauth-exchange`, and `web` is dependent on `domain`,
/// but `web` should not be dependent, directly, on `oauth-exchange`. Ultimately the various
/// `error_kind`s are used by `web` to return appropriate HTTP status codes and messages to the client.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Entity(EntityErrorKind),
    Config,
    Other(String),
}

/// Errors about accounts, roles and sessions held by the domain.
#[derive(Debug, PartialEq)]
pub enum EntityErrorKind {
    NotFound,
    Invalid,
    Unauthenticated,
    Other(String),
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Network,
    Authorization(AuthorizationErrorKind),
    Other(String),
}

/// Problems with a third-party sign-in that are caused by the request rather than the provider.
#[derive(Debug, PartialEq)]
pub enum AuthorizationErrorKind {
    UnknownProvider,
    InvalidRequest,
    InvalidState,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `oauth-exchange` layer to the `domain` layer.
impl From<OAuthExchangeError> for Error {
    fn from(err: OAuthExchangeError) -> Self {
        let error_kind = match &err.error_kind {
            OAuthExchangeErrorKind::Config(_) => DomainErrorKind::Internal(InternalErrorKind::Config),
            OAuthExchangeErrorKind::UnknownProvider => DomainErrorKind::External(
                ExternalErrorKind::Authorization(AuthorizationErrorKind::UnknownProvider),
            ),
            OAuthExchangeErrorKind::InvalidRequest => DomainErrorKind::External(
                ExternalErrorKind::Authorization(AuthorizationErrorKind::InvalidRequest),
            ),
            OAuthExchangeErrorKind::InvalidState => DomainErrorKind::External(
                ExternalErrorKind::Authorization(AuthorizationErrorKind::InvalidState),
            ),
            OAuthExchangeErrorKind::Upstream(oauth_exchange::error::UpstreamErrorKind::Network) => {
                DomainErrorKind::External(ExternalErrorKind::Network)
            }
            OAuthExchangeErrorKind::Upstream(_) | OAuthExchangeErrorKind::MalformedResponse(_) => {
                DomainErrorKind::External(ExternalErrorKind::Other(err.to_string()))
            }
            OAuthExchangeErrorKind::State(_) => {
                DomainErrorKind::Internal(InternalErrorKind::Other(err.to_string()))
            }
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

/// Helper to build an entity error with a message as its source.
pub fn entity_error(kind: EntityErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(kind)),
    }
}
