use crate::{
    controller::{health_check_controller, oauth_controller, user_session_controller},
    params, response, AppState,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::path::Path;
use tower_http::services::ServeDir;

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Localiday API"
        ),
        paths(
            health_check_controller::health_check,
            oauth_controller::authenticate,
            oauth_controller::callback,
            user_session_controller::action,
        ),
        components(
            schemas(
                params::user_action::Credentials,
                response::user_session::UserSessionResponse,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "localiday", description = "Localiday sign-in API")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Sessions are presented as bearer tokens carrying the session id.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some(
                            "Session id returned as SessionID from login or the OAuth callback",
                        ))
                        .build(),
                ),
            )
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    let static_dir = app_state.config.static_dir.clone();

    Router::new()
        .merge(health_routes())
        .merge(oauth_routes(app_state.clone()))
        .merge(user_session_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
        .fallback_service(static_routes(&static_dir))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn oauth_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/oauth/authenticate/{provider}",
            get(oauth_controller::authenticate),
        )
        .route(
            "/oauth/callback/{provider}",
            get(oauth_controller::callback),
        )
        .with_state(app_state)
}

fn user_session_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/r/user/{action}", post(user_session_controller::action))
        .with_state(app_state)
}

fn static_routes(static_dir: &Path) -> ServeDir {
    ServeDir::new(static_dir)
}
