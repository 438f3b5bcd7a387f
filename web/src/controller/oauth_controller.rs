//! Controller for third-party sign-in flows.
//!
//! Both endpoints are reached through browser redirects, so they answer with
//! redirects rather than JSON.

use crate::params::oauth::CallbackParams;
use crate::{AppState, Error};

use axum::extract::{Path, Query, State};
use axum::http::{header::LOCATION, StatusCode};
use axum::response::IntoResponse;
use domain::oauth as OAuthApi;
use log::*;

fn found(location: String) -> impl IntoResponse {
    (StatusCode::FOUND, [(LOCATION, location)])
}

/// GET /oauth/authenticate/{provider}
///
/// Starts a sign-in by redirecting to the provider's authorization page.
#[utoipa::path(
    get,
    path = "/oauth/authenticate/{provider}",
    params(
        ("provider" = String, Path, description = "Configured provider name, e.g. google or twitter"),
    ),
    responses(
        (status = 302, description = "Redirect to the provider's authorization page"),
        (status = 400, description = "Unknown provider"),
        (status = 500, description = "Provider could not be reached"),
    )
)]
pub async fn authenticate(
    State(app_state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<impl IntoResponse, Error> {
    let url = OAuthApi::begin_login(app_state.exchange_ref(), &provider).await?;
    debug!("Redirecting user to oauth endpoint {url}.");
    Ok(found(url))
}

/// GET /oauth/callback/{provider}
///
/// Completes a sign-in and redirects to the application with the new session id.
#[utoipa::path(
    get,
    path = "/oauth/callback/{provider}",
    params(
        ("provider" = String, Path, description = "Configured provider name"),
        CallbackParams,
    ),
    responses(
        (status = 302, description = "Redirect to /?token={sessionID}"),
        (status = 400, description = "Neither state nor oauth_token was supplied"),
        (status = 403, description = "State or token is not pending"),
        (status = 500, description = "Token exchange or profile lookup failed"),
    )
)]
pub async fn callback(
    State(app_state): State<AppState>,
    Path(provider): Path<String>,
    Query(params): Query<CallbackParams>,
) -> Result<impl IntoResponse, Error> {
    let user_session = OAuthApi::complete_login(
        app_state.exchange_ref(),
        app_state.accounts_ref(),
        &provider,
        &params.into(),
    )
    .await?;

    Ok(found(format!("/?token={}", user_session.session.session_id)))
}
