use crate::Id;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;

const SESSION_ID_BYTES: usize = 32;

/// A signed-in user's session, keyed by an opaque session id.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub session_id: String,
    pub user_id: Id,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    /// Provider the session was created through, if any.
    pub oauth_provider: Option<String>,
}

impl Session {
    pub fn new(user_id: Id, oauth_provider: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: generate_session_id(),
            user_id,
            created_at: now,
            last_accessed: now,
            oauth_provider,
        }
    }

    /// Live when accessed within `timeout`. A cutoff before chrono's range keeps it live.
    pub fn is_live(&self, timeout: Duration, now: DateTime<Utc>) -> bool {
        now.checked_sub_signed(timeout)
            .map(|cutoff| self.last_accessed > cutoff)
            .unwrap_or(true)
    }

    pub fn touch(&mut self) {
        self.last_accessed = Utc::now();
    }
}

/// 32 random bytes, URL-safe base64.
pub fn generate_session_id() -> String {
    let random_bytes: [u8; SESSION_ID_BYTES] = rand::thread_rng().gen();
    URL_SAFE.encode(random_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_length_and_uniqueness() {
        let first = generate_session_id();
        assert_eq!(first.len(), 44);
        assert_ne!(first, generate_session_id());
        assert!(!first.contains('+') && !first.contains('/'));
    }

    #[test]
    fn test_is_live() {
        let mut session = Session::new(Id::new_v4(), None);
        let now = Utc::now();
        assert!(session.is_live(Duration::seconds(300), now));

        session.last_accessed = now - Duration::seconds(301);
        assert!(!session.is_live(Duration::seconds(300), now));
    }

    #[test]
    fn test_timeout_beyond_date_range_stays_live() {
        let session = Session::new(Id::new_v4(), None);
        assert!(session.is_live(Duration::seconds(10_000_000_000_000), Utc::now()));
    }
}
