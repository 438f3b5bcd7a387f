use crate::error::{entity_error, EntityErrorKind, Error};
use crate::Id;
use log::*;
use serde::Serialize;

/// A local account. Password-only users and users created from a third-party
/// sign-in look the same; the latter carry the provider's user id as username.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Id,
    pub username: String,
    #[serde(skip)]
    pub password: String,
    pub full_name: String,
    pub nick_name: String,
    pub email: String,
    pub password_expired: bool,
    pub active: bool,
}

impl User {
    /// Create an active user, hashing `password`.
    pub fn new(
        username: &str,
        password: &str,
        full_name: &str,
        nick_name: &str,
        email: &str,
    ) -> Self {
        Self {
            id: Id::new_v4(),
            username: username.to_string(),
            password: generate_hash(password),
            full_name: full_name.to_string(),
            nick_name: nick_name.to_string(),
            email: email.to_string(),
            password_expired: false,
            active: true,
        }
    }

    pub fn set_password(&mut self, password: &str) {
        self.password = generate_hash(password);
    }
}

pub fn generate_hash(password: &str) -> String {
    password_auth::generate_hash(password)
}

pub fn verify_password(password_to_verify: &str, password_hash: &str) -> Result<(), Error> {
    match password_auth::verify_password(password_to_verify, password_hash) {
        Ok(_) => Ok(()),
        Err(_) => {
            debug!("Passwords did not match");
            Err(entity_error(
                EntityErrorKind::Unauthenticated,
                "Username and password do not match.",
            ))
        }
    }
}
