//! In-memory users, roles and sessions; the session issuer for password and
//! third-party sign-in.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{Duration, Utc};
use log::*;
use oauth_exchange::ExternalIdentity;
use rand::Rng;

use crate::error::{entity_error, EntityErrorKind, Error};
use crate::role::{provider_role, Role, BOOTSTRAP_ROLES, ROLE_ADMIN, ROLE_OPEN_AUTH_USER, ROLE_SYSTEM_USER, ROLE_USER};
use crate::session::Session;
use crate::user::{verify_password, User};
use crate::Id;

pub const DEFAULT_SESSION_TIMEOUT_SECS: i64 = 300;

/// A user together with one of their sessions and granted authorities.
#[derive(Debug, Clone)]
pub struct UserSession {
    pub user: User,
    pub session: Session,
    pub authorities: Vec<String>,
}

#[derive(Debug, Default)]
struct AccountStore {
    users: HashMap<Id, User>,
    roles: Vec<Role>,
    user_roles: HashMap<Id, Vec<Id>>,
    sessions: HashMap<String, Session>,
}

impl AccountStore {
    fn find_user_by_username(&self, username: &str) -> Option<&User> {
        self.users.values().find(|user| user.username == username)
    }

    fn find_role(&self, authority: &str) -> Option<&Role> {
        self.roles.iter().find(|role| role.authority == authority)
    }

    fn authorities(&self, user_id: Id) -> Vec<String> {
        self.user_roles
            .get(&user_id)
            .map(|role_ids| {
                role_ids
                    .iter()
                    .filter_map(|id| self.roles.iter().find(|role| role.id == *id))
                    .map(|role| role.authority.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn grant(&mut self, user_id: Id, authority: &str) -> Result<(), Error> {
        let role_id = self
            .find_role(authority)
            .map(|role| role.id)
            .ok_or_else(|| {
                entity_error(EntityErrorKind::NotFound, &format!("No role {authority}"))
            })?;

        let granted = self.user_roles.entry(user_id).or_default();
        if !granted.contains(&role_id) {
            granted.push(role_id);
        }
        Ok(())
    }

    /// Reuse the user's live session, or create one.
    fn open_session(
        &mut self,
        user_id: Id,
        oauth_provider: Option<String>,
        timeout: Duration,
    ) -> Session {
        let now = Utc::now();
        if let Some(session) = self
            .sessions
            .values_mut()
            .find(|session| session.user_id == user_id && session.is_live(timeout, now))
        {
            session.touch();
            return session.clone();
        }

        let session = Session::new(user_id, oauth_provider);
        self.sessions
            .insert(session.session_id.clone(), session.clone());
        session
    }

    fn user_session(&self, user: &User, session: Session) -> UserSession {
        UserSession {
            user: user.clone(),
            session,
            authorities: self.authorities(user.id),
        }
    }
}

/// Users, roles and sessions behind one lock.
#[derive(Debug)]
pub struct Accounts {
    store: Mutex<AccountStore>,
    session_timeout: Duration,
}

impl Default for Accounts {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_SESSION_TIMEOUT_SECS))
    }
}

impl Accounts {
    pub fn new(session_timeout: Duration) -> Self {
        Self {
            store: Mutex::new(AccountStore::default()),
            session_timeout,
        }
    }

    fn lock(&self) -> MutexGuard<'_, AccountStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn session_timeout(&self) -> Duration {
        self.session_timeout
    }

    /// Create the default roles and the `admin` user when no users exist yet.
    pub fn bootstrap(&self, admin_password: &str) -> Result<(), Error> {
        if self.count_users() > 0 {
            return Ok(());
        }

        let admin = User::new("admin", admin_password, "", "admin", "admin@localiday.com");

        let mut store = self.lock();
        for authority in BOOTSTRAP_ROLES {
            if store.find_role(authority).is_none() {
                store.roles.push(Role::new(authority));
                debug!("Added role {authority}");
            }
        }

        let admin_id = admin.id;
        store.users.insert(admin_id, admin);
        for authority in [ROLE_USER, ROLE_ADMIN, ROLE_SYSTEM_USER] {
            store.grant(admin_id, authority)?;
        }
        debug!("Created user admin.");
        Ok(())
    }

    /// Add a role if it does not exist yet.
    pub fn create_role(&self, authority: &str) -> Role {
        let mut store = self.lock();
        if let Some(role) = store.find_role(authority) {
            return role.clone();
        }
        let role = Role::new(authority);
        store.roles.push(role.clone());
        role
    }

    /// Insert a new user. Usernames are unique.
    pub fn create_user(&self, user: User) -> Result<User, Error> {
        let mut store = self.lock();
        if store.find_user_by_username(&user.username).is_some() {
            return Err(entity_error(
                EntityErrorKind::Invalid,
                &format!("Username {} is taken", user.username),
            ));
        }
        store.users.insert(user.id, user.clone());
        Ok(user)
    }

    pub fn grant(&self, user_id: Id, authority: &str) -> Result<(), Error> {
        self.lock().grant(user_id, authority)
    }

    pub fn find_by_username(&self, username: &str) -> Option<User> {
        self.lock().find_user_by_username(username).cloned()
    }

    pub fn authorities(&self, user_id: Id) -> Vec<String> {
        self.lock().authorities(user_id)
    }

    /// Password sign-in. Reuses the user's live session when there is one.
    pub fn login(&self, username: &str, password: &str) -> Result<UserSession, Error> {
        let password_hash = match self.find_by_username(username) {
            Some(user) if user.active => user.password,
            _ => {
                debug!("Could not find user: {username}");
                return Err(entity_error(
                    EntityErrorKind::Unauthenticated,
                    "Could not find a user with the supplied username.",
                ));
            }
        };

        verify_password(password, &password_hash)?;

        let mut store = self.lock();
        let user = store
            .find_user_by_username(username)
            .cloned()
            .ok_or_else(|| entity_error(EntityErrorKind::NotFound, "User removed during login"))?;
        let session = store.open_session(user.id, None, self.session_timeout);
        info!("User {} logged in", user.username);
        Ok(store.user_session(&user, session))
    }

    /// Issue a session for a user identified by a third-party provider.
    ///
    /// The external id is the local username. Unknown users are created with a
    /// random password and granted `USER`, `OPEN_AUTH_USER` and the provider's
    /// role when it exists.
    pub fn create_session_for_oauth_user(
        &self,
        identity: &ExternalIdentity,
        provider: &str,
    ) -> Result<UserSession, Error> {
        let candidate = if self.find_by_username(&identity.id).is_none() {
            let random_bytes: [u8; 20] = rand::thread_rng().gen();
            Some(User::new(
                &identity.id,
                &STANDARD.encode(random_bytes),
                &identity.name,
                &identity.screen_name,
                identity.email.as_deref().unwrap_or_default(),
            ))
        } else {
            None
        };

        let mut store = self.lock();
        let user = match store.find_user_by_username(&identity.id).cloned() {
            Some(existing) => existing,
            None => {
                let user = candidate.ok_or_else(|| {
                    entity_error(EntityErrorKind::NotFound, "User removed during sign-in")
                })?;
                store.users.insert(user.id, user.clone());

                for authority in [
                    ROLE_USER.to_string(),
                    ROLE_OPEN_AUTH_USER.to_string(),
                    provider_role(provider),
                ] {
                    if let Err(err) = store.grant(user.id, &authority) {
                        debug!("Role {authority} not granted to {}: {err}", user.username);
                    }
                }
                info!("Created {provider} user {}", user.username);
                user
            }
        };

        if !user.active {
            return Err(entity_error(
                EntityErrorKind::Unauthenticated,
                "User is not active",
            ));
        }

        let session = store.open_session(
            user.id,
            Some(provider.to_lowercase()),
            self.session_timeout,
        );
        Ok(store.user_session(&user, session))
    }

    /// Look up a live session and mark it accessed.
    pub fn validate(&self, session_id: &str) -> Result<UserSession, Error> {
        let mut store = self.lock();
        let now = Utc::now();
        let timeout = self.session_timeout;

        let session = store
            .sessions
            .get_mut(session_id)
            .filter(|session| session.is_live(timeout, now))
            .map(|session| {
                session.touch();
                session.clone()
            })
            .ok_or_else(|| {
                entity_error(EntityErrorKind::Unauthenticated, "Session is not valid")
            })?;

        let user = store.users.get(&session.user_id).cloned().ok_or_else(|| {
            entity_error(EntityErrorKind::Unauthenticated, "Session user no longer exists")
        })?;

        Ok(store.user_session(&user, session))
    }

    /// End a session. Returns whether it existed.
    pub fn logout(&self, session_id: &str) -> bool {
        self.lock().sessions.remove(session_id).is_some()
    }

    /// Drop sessions idle longer than the timeout. Returns how many were removed.
    pub fn purge_expired_sessions(&self) -> usize {
        let started = Utc::now();
        let timeout = self.session_timeout;

        let mut store = self.lock();
        let before = store.sessions.len();
        store
            .sessions
            .retain(|_, session| session.is_live(timeout, started));
        let purged = before - store.sessions.len();

        info!(
            "Purged {purged} expired sessions in {}ms.",
            (Utc::now() - started).num_milliseconds()
        );
        purged
    }

    pub fn count_users(&self) -> usize {
        self.lock().users.len()
    }

    pub fn count_active_users(&self) -> usize {
        self.lock().users.values().filter(|user| user.active).count()
    }

    pub fn count_sessions(&self) -> usize {
        self.lock().sessions.len()
    }
}
