//! In-memory login sessions keyed by an opaque token.

use crate::error::AppError;
use crate::model::User;
use crate::model::timestamp;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub zen_mode: bool,
    #[serde(with = "timestamp::required")]
    pub created_at: OffsetDateTime,
}

/// Lives as long as the process; nothing is persisted. A session ends on
/// logout or when its user is deleted; there is no idle expiry.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a session for the user whose email matches, ignoring case.
    pub fn login(
        &self,
        users: &[User],
        email: &str,
        now: OffsetDateTime,
    ) -> Result<Session, AppError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AppError::invalid_input("email is required"));
        }
        let user = users
            .iter()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .ok_or_else(|| AppError::not_found(format!("no user with email {email}")))?;

        let session = Session {
            token: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            zen_mode: false,
            created_at: now,
        };
        self.lock()?
            .insert(session.token.clone(), session.clone());
        tracing::info!(user_id = %session.user_id, "session opened");
        Ok(session)
    }

    pub fn get(&self, token: &str) -> Result<Session, AppError> {
        self.lock()?
            .get(token)
            .cloned()
            .ok_or_else(|| AppError::not_found("session not found"))
    }

    pub fn logout(&self, token: &str) -> Result<Session, AppError> {
        let removed = self
            .lock()?
            .remove(token)
            .ok_or_else(|| AppError::not_found("session not found"))?;
        tracing::info!(user_id = %removed.user_id, "session closed");
        Ok(removed)
    }

    /// Closes every session of `user_id`, e.g. after the user is deleted.
    /// Returns how many were open.
    pub fn end_user_sessions(&self, user_id: &str) -> Result<usize, AppError> {
        let mut sessions = self.lock()?;
        let before = sessions.len();
        sessions.retain(|_, session| session.user_id != user_id);
        let closed = before - sessions.len();
        if closed > 0 {
            tracing::info!(user_id, closed, "sessions closed for removed user");
        }
        Ok(closed)
    }

    pub fn set_zen_mode(&self, token: &str, enabled: bool) -> Result<Session, AppError> {
        let mut sessions = self.lock()?;
        let session = sessions
            .get_mut(token)
            .ok_or_else(|| AppError::not_found("session not found"))?;
        session.zen_mode = enabled;
        Ok(session.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Session>>, AppError> {
        self.sessions
            .lock()
            .map_err(|_| AppError::invalid_data("session store poisoned"))
    }
}

#[cfg(test)]
mod tests {
    use super::SessionStore;
    use crate::model::User;
    use time::macros::datetime;

    fn users() -> Vec<User> {
        vec![User {
            id: "u1".to_string(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
        }]
    }

    #[test]
    fn login_toggle_and_logout() {
        let store = SessionStore::new();
        let now = datetime!(2025-01-01 08:00 UTC);

        let session = store.login(&users(), " ANA@example.com ", now).unwrap();
        assert_eq!(session.user_id, "u1");
        assert!(!session.zen_mode);

        let toggled = store.set_zen_mode(&session.token, true).unwrap();
        assert!(toggled.zen_mode);
        assert!(store.get(&session.token).unwrap().zen_mode);

        store.logout(&session.token).unwrap();
        assert_eq!(store.get(&session.token).unwrap_err().code(), "not_found");
    }

    #[test]
    fn unknown_email_is_rejected() {
        let store = SessionStore::new();
        let now = datetime!(2025-01-01 08:00 UTC);
        let err = store.login(&users(), "ghost@example.com", now).unwrap_err();
        assert_eq!(err.code(), "not_found");
    }

    #[test]
    fn tokens_are_distinct() {
        let store = SessionStore::new();
        let now = datetime!(2025-01-01 08:00 UTC);
        let first = store.login(&users(), "ana@example.com", now).unwrap();
        let second = store.login(&users(), "ana@example.com", now).unwrap();
        assert_ne!(first.token, second.token);
    }

    #[test]
    fn deleting_user_ends_their_sessions_only() {
        let store = SessionStore::new();
        let now = datetime!(2025-01-01 08:00 UTC);
        let mut people = users();
        people.push(User {
            id: "u2".to_string(),
            name: "Bo".to_string(),
            email: "bo@example.com".to_string(),
        });

        let first = store.login(&people, "ana@example.com", now).unwrap();
        let second = store.login(&people, "ana@example.com", now).unwrap();
        let other = store.login(&people, "bo@example.com", now).unwrap();

        assert_eq!(store.end_user_sessions("u1").unwrap(), 2);
        assert_eq!(store.get(&first.token).unwrap_err().code(), "not_found");
        assert_eq!(store.get(&second.token).unwrap_err().code(), "not_found");
        assert_eq!(store.get(&other.token).unwrap().user_id, "u2");
        assert_eq!(store.end_user_sessions("u1").unwrap(), 0);
    }
}
