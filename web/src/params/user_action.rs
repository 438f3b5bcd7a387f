use crate::error::{Error, WebErrorKind};
use serde::Deserialize;
use std::str::FromStr;
use utoipa::ToSchema;

/// Actions accepted by `POST /r/user/{action}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UserAction {
    Login,
    Logout,
    Validate,
}

impl FromStr for UserAction {
    type Err = Error;

    fn from_str(action: &str) -> Result<Self, Self::Err> {
        match action.to_lowercase().as_str() {
            "login" => Ok(UserAction::Login),
            "logout" => Ok(UserAction::Logout),
            "validate" => Ok(UserAction::Validate),
            _ => Err(Error::Web(WebErrorKind::MethodNotAllowed)),
        }
    }
}

/// Login request body.
#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({"Username": "admin", "Password": "admin"}))]
pub struct Credentials {
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Password")]
    pub password: String,
}
