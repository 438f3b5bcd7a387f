//! Flow stages of one login attempt.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::*;
use secrecy::SecretString;

use crate::provider::{OAuthVersion, ProviderConfig};

/// Where a login attempt currently is.
///
/// OAuth 1.0a: `Idle -> RequestTokenFetched -> AwaitingUserAuthorization ->
/// AccessTokenFetched -> IdentityFetched -> SessionCreated`.
///
/// OAuth 2.0: `Idle -> AwaitingUserAuthorization -> CodeReceived ->
/// IdentityFetched -> SessionCreated`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowStage {
    Idle,
    RequestTokenFetched,
    AwaitingUserAuthorization,
    AccessTokenFetched,
    CodeReceived,
    IdentityFetched,
    SessionCreated,
    Failed(String),
}

impl FlowStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, FlowStage::SessionCreated | FlowStage::Failed(_))
    }

    /// Whether `next` is a legal successor of this stage for `version`.
    pub fn can_advance_to(&self, next: &FlowStage, version: OAuthVersion) -> bool {
        use FlowStage::*;

        if self.is_terminal() {
            return false;
        }
        if let Failed(_) = next {
            return true;
        }

        match version {
            OAuthVersion::V1 => matches!(
                (self, next),
                (Idle, RequestTokenFetched)
                    | (RequestTokenFetched, AwaitingUserAuthorization)
                    | (AwaitingUserAuthorization, AccessTokenFetched)
                    | (AccessTokenFetched, IdentityFetched)
                    | (IdentityFetched, SessionCreated)
            ),
            OAuthVersion::V2 => matches!(
                (self, next),
                (Idle, AwaitingUserAuthorization)
                    | (AwaitingUserAuthorization, CodeReceived)
                    | (CodeReceived, IdentityFetched)
                    | (IdentityFetched, SessionCreated)
            ),
        }
    }
}

impl fmt::Display for FlowStage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FlowStage::Failed(reason) => write!(f, "Failed({reason})"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// One in-flight login, created at initiation and consumed by the callback.
#[derive(Debug)]
pub struct FlowAttempt {
    /// `state` for 2.0, the provider-issued request token for 1.0a.
    pub key: String,
    pub provider: Arc<ProviderConfig>,
    /// Request-token secret, 1.0a only.
    pub request_token_secret: Option<SecretString>,
    pub stage: FlowStage,
    pub created_at: DateTime<Utc>,
}

impl FlowAttempt {
    pub fn new(key: String, provider: Arc<ProviderConfig>) -> Self {
        Self {
            key,
            provider,
            request_token_secret: None,
            stage: FlowStage::Idle,
            created_at: Utc::now(),
        }
    }

    /// Move to `next`. Returns false and leaves the stage unchanged on an illegal transition.
    pub fn advance(&mut self, next: FlowStage) -> bool {
        if !self.stage.can_advance_to(&next, self.provider.version()) {
            warn!(
                "Rejected {} flow transition {} -> {} for {}",
                self.provider.name, self.stage, next, self.key
            );
            return false;
        }

        trace!(
            "{} flow {}: {} -> {}",
            self.provider.name,
            self.key,
            self.stage,
            next
        );
        self.stage = next;
        true
    }

    /// Record a failure from any non-terminal stage.
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.advance(FlowStage::Failed(reason.into()));
    }
}
