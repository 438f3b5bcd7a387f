use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use domain::error::{
    AuthorizationErrorKind, DomainErrorKind, EntityErrorKind, Error as DomainError,
    ExternalErrorKind, InternalErrorKind,
};
use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    Domain(DomainError),
    Web(WebErrorKind),
}

/// Errors raised by the web layer itself, before any domain call.
#[derive(Debug, PartialEq)]
pub enum WebErrorKind {
    /// Malformed request body or parameters
    Input,
    /// Missing or malformed `Authorization` header
    Auth,
    /// Unknown user action
    MethodNotAllowed,
}

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html#associatedconstant.UNPROCESSABLE_ENTITY
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Domain(domain_error) => {
                let status = domain_status(&domain_error.error_kind);
                if status.is_server_error() {
                    error!("{domain_error}");
                } else {
                    debug!("{domain_error}");
                }
                (status, status.canonical_reason().unwrap_or_default()).into_response()
            }
            Error::Web(web_error_kind) => {
                let status = match web_error_kind {
                    WebErrorKind::Input => StatusCode::BAD_REQUEST,
                    WebErrorKind::Auth => StatusCode::UNAUTHORIZED,
                    WebErrorKind::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
                };
                (status, status.canonical_reason().unwrap_or_default()).into_response()
            }
        }
    }
}

fn domain_status(error_kind: &DomainErrorKind) -> StatusCode {
    match error_kind {
        DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
            InternalErrorKind::Entity(entity_error_kind) => match entity_error_kind {
                EntityErrorKind::NotFound => StatusCode::NOT_FOUND,
                EntityErrorKind::Invalid => StatusCode::UNPROCESSABLE_ENTITY,
                EntityErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
                EntityErrorKind::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            InternalErrorKind::Config | InternalErrorKind::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        },
        DomainErrorKind::External(external_error_kind) => match external_error_kind {
            ExternalErrorKind::Authorization(authorization_error_kind) => {
                match authorization_error_kind {
                    AuthorizationErrorKind::UnknownProvider
                    | AuthorizationErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
                    AuthorizationErrorKind::InvalidState => StatusCode::FORBIDDEN,
                }
            }
            ExternalErrorKind::Network | ExternalErrorKind::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        },
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self::Domain(err.into())
    }
}
