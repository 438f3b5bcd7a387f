use crate::controller::ApiResponse;
use crate::error::{Error, WebErrorKind};
use crate::extractors::bearer_session::bearer_session_id;
use crate::params::user_action::{Credentials, UserAction};
use crate::response::user_session::UserSessionResponse;
use crate::AppState;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::*;

/// POST /r/user/{action}
///
/// `login` reads `{"Username", "Password"}` from the body. `logout` and `validate`
/// read the session id from `Authorization: Bearer {sessionID}`.
#[utoipa::path(
    post,
    path = "/r/user/{action}",
    params(
        ("action" = String, Path, description = "One of login, logout or validate"),
    ),
    request_body(content = Credentials, description = "Required for login"),
    responses(
        (status = 200, description = "Signed-in user and session", body = UserSessionResponse),
        (status = 400, description = "Login body is not valid JSON credentials"),
        (status = 401, description = "Bad credentials or session"),
        (status = 405, description = "Unknown action"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn action(
    State(app_state): State<AppState>,
    Path(action): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, Error> {
    let accounts = app_state.accounts_ref();

    match action.parse::<UserAction>()? {
        UserAction::Login => {
            let credentials: Credentials = serde_json::from_slice(&body).map_err(|err| {
                debug!("Could not read login credentials: {err}");
                Error::Web(WebErrorKind::Input)
            })?;
            let user_session = accounts.login(&credentials.username, &credentials.password)?;
            Ok(Json(UserSessionResponse::from(user_session)).into_response())
        }
        UserAction::Logout => {
            let session_id = bearer_session_id(&headers)?;
            if !accounts.logout(&session_id) {
                debug!("Logout of a session that was not open");
            }
            Ok(Json(ApiResponse::<()>::no_content(StatusCode::OK.into())).into_response())
        }
        UserAction::Validate => {
            let session_id = bearer_session_id(&headers)?;
            let user_session = accounts.validate(&session_id)?;
            Ok(Json(UserSessionResponse::from(user_session)).into_response())
        }
    }
}
