use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a login session.
///
/// The bearer token itself is never part of this record. Stores key sessions
/// by the SHA-256 digest of the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The ID of the user this session belongs to.
    pub user_id: Uuid,
    /// The timestamp when the session was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the session expires.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Creates a session for `user_id` that lasts `duration`.
    pub fn new(user_id: Uuid, duration: chrono::Duration) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            created_at: now,
            expires_at: now + duration,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Seconds until expiry, at least 1 so stores never get a zero TTL.
    pub fn ttl_seconds(&self) -> u64 {
        (self.expires_at - Utc::now()).num_seconds().max(1) as u64
    }
}

/// The per-request authentication state resolved from the session cookie.
#[derive(Debug, Clone)]
pub enum AuthState {
    Anonymous,
    Authenticated(Session),
}

impl AuthState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthState::Anonymous => None,
            AuthState::Authenticated(session) => Some(session),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_is_inclusive_of_the_deadline() {
        let session = Session::new(Uuid::new_v4(), chrono::Duration::days(1));
        assert!(!session.is_expired_at(session.created_at));
        assert!(session.is_expired_at(session.expires_at));
        assert!(session.ttl_seconds() > 86_000);
    }

    #[test]
    fn anonymous_state_has_no_session() {
        assert!(AuthState::Anonymous.session().is_none());
        let session = Session::new(Uuid::new_v4(), chrono::Duration::hours(1));
        let state = AuthState::Authenticated(session.clone());
        assert_eq!(state.session(), Some(&session));
    }
}
