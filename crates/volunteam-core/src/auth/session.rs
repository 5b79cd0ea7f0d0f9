use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::models::User;

/// Token issued by the mock backend flow; the backend does not check it.
pub const PLACEHOLDER_TOKEN: &str = "dummy-token";

/// The signed-in user and its access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub access_token: String,
}

impl Session {
    pub fn new(user: User, access_token: impl Into<String>) -> Self {
        Self {
            user,
            access_token: access_token.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn email(&self) -> &str {
        &self.user.email
    }
}

/// Holds the current session for everything that needs the signed-in user.
///
/// Clones share state. Readers that want to react to sign-in and sign-out
/// can `subscribe`.
#[derive(Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<Option<Session>>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> Option<Session> {
        self.tx.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_some()
    }

    pub fn set(&self, session: Session) {
        self.tx.send_replace(Some(session));
    }

    pub fn clear(&self) {
        self.tx.send_replace(None);
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PersonName;

    fn user() -> User {
        User {
            id: "42".to_string(),
            email: "ana@example.com".to_string(),
            password_hash: "$2b$04$hash".to_string(),
            name: PersonName::default(),
            mobile: String::new(),
        }
    }

    #[test]
    fn test_store_set_and_clear() {
        let store = SessionStore::new();
        assert!(store.current().is_none());

        store.set(Session::new(user(), PLACEHOLDER_TOKEN));
        let current = store.current().expect("session");
        assert_eq!(current.user_id(), "42");
        assert_eq!(current.access_token, "dummy-token");

        store.clear();
        assert!(!store.is_authenticated());
        store.clear();
        assert!(store.current().is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let store = SessionStore::new();
        let screen = store.clone();
        store.set(Session::new(user(), "t"));
        assert_eq!(screen.current().map(|s| s.email().to_string()).as_deref(), Some("ana@example.com"));
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let store = SessionStore::new();
        let mut rx = store.subscribe();

        store.set(Session::new(user(), "t"));
        rx.changed().await.expect("changed");
        assert!(rx.borrow_and_update().is_some());

        store.clear();
        rx.changed().await.expect("changed");
        assert!(rx.borrow_and_update().is_none());
    }
}
