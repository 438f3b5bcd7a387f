use serde::Deserialize;
use utoipa::IntoParams;

/// Query parameters a provider sends back to the callback.
///
/// OAuth 2.0 providers send `state` and `code` (or `error`); OAuth 1.0a
/// providers send `oauth_token` and `oauth_verifier`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CallbackParams {
    /// Correlation value issued when the login started (OAuth 2.0)
    pub state: Option<String>,
    /// Authorization code (OAuth 2.0)
    pub code: Option<String>,
    /// Request token being authorized (OAuth 1.0a)
    pub oauth_token: Option<String>,
    /// Verifier for the request token (OAuth 1.0a)
    pub oauth_verifier: Option<String>,
    /// Error code reported by the provider
    pub error: Option<String>,
}

impl From<CallbackParams> for domain::CallbackParams {
    fn from(params: CallbackParams) -> Self {
        domain::CallbackParams {
            state: params.state,
            code: params.code,
            oauth_token: params.oauth_token,
            oauth_verifier: params.oauth_verifier,
            error: params.error,
        }
    }
}
