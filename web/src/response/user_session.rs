//! User JSON returned by login and validate.

use domain::accounts::UserSession;
use domain::Id;
use serde::Serialize;
use utoipa::ToSchema;

/// A signed-in user and the session the client must send back as a bearer token.
/// Never carries the password.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct UserSessionResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: Id,
    pub username: String,
    pub full_name: String,
    pub nick_name: String,
    pub email: String,
    pub password_expired: bool,
    pub active: bool,
    #[serde(rename = "SessionID")]
    pub session_id: String,
    pub token_type: String,
    pub authorities: Vec<String>,
    /// Unix seconds
    pub last_accessed: i64,
}

impl From<UserSession> for UserSessionResponse {
    fn from(user_session: UserSession) -> Self {
        let UserSession {
            user,
            session,
            authorities,
        } = user_session;

        Self {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            nick_name: user.nick_name,
            email: user.email,
            password_expired: user.password_expired,
            active: user.active,
            session_id: session.session_id,
            token_type: "Bearer".to_string(),
            authorities,
            last_accessed: session.last_accessed.timestamp(),
        }
    }
}
