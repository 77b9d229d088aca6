//! Session
//!
//! The signed-in user and their bearer token. Token issuance and verification belong
//! to the backend; this module only keeps the result of a login around.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::{
    storage::{Storage, StorageError},
    subscribers::{SubscriptionKey, Subscribers},
};

/// Storage key for the raw bearer token.
pub const TOKEN_KEY: &str = "token";

/// Storage key for the signed-in user.
pub const USER_KEY: &str = "user";

/// A signed-in user as returned by the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User id
    #[serde(alias = "_id")]
    pub id: String,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Back-office access
    #[serde(default)]
    pub is_admin: bool,
}

/// A bearer token together with the user it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Bearer token
    pub token: String,

    /// Signed-in user
    pub user: User,
}

/// Change broadcast to session subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    /// A user signed in.
    SignedIn(User),

    /// The user signed out.
    SignedOut,
}

/// Persisted authentication session.
#[derive(Debug)]
pub struct SessionStore<S: Storage> {
    storage: S,
    session: Option<Session>,
    subscribers: Subscribers<SessionChange>,
}

impl<S: Storage> SessionStore<S> {
    /// Restore a saved session. Partial or corrupt data yields a signed-out store.
    pub fn new(storage: S) -> Self {
        let session = load_session(&storage);

        Self {
            storage,
            session,
            subscribers: Subscribers::new(),
        }
    }

    /// Store a new session, replacing any current one.
    ///
    /// If the session cannot be saved, both slots are cleared so a restart comes up
    /// signed out instead of pairing the new token with a previous user.
    pub fn sign_in(&mut self, session: Session) {
        debug!(user = %session.user.id, "signing in");

        if let Err(err) = save_session(&mut self.storage, &session) {
            error!(error = %err, "failed to persist session; clearing saved session");
            clear_slots(&mut self.storage);
        }

        let change = SessionChange::SignedIn(session.user.clone());

        self.session = Some(session);
        self.subscribers.notify(&change);
    }

    /// Forget the current session and clear both slots.
    ///
    /// Subscribers are only notified if a user was signed in.
    pub fn sign_out(&mut self) {
        debug!("signing out");

        clear_slots(&mut self.storage);

        if self.session.take().is_some() {
            self.subscribers.notify(&SessionChange::SignedOut);
        }
    }

    /// Current session, if signed in.
    #[must_use]
    pub fn current(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Current user, if signed in.
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|session| &session.user)
    }

    /// Whether a user is signed in.
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    /// Whether the signed-in user has back-office access.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user().is_some_and(|user| user.is_admin)
    }

    /// Value for the `Authorization` header of backend requests.
    #[must_use]
    pub fn authorization_header(&self) -> Option<String> {
        self.session
            .as_ref()
            .map(|session| format!("Bearer {}", session.token))
    }

    /// First word of the user's name, for greetings.
    #[must_use]
    pub fn first_name(&self) -> Option<&str> {
        self.user()
            .and_then(|user| user.name.split_whitespace().next())
    }

    /// Register a listener called on sign in and sign out.
    pub fn subscribe(&mut self, listener: impl FnMut(&SessionChange) + 'static) -> SubscriptionKey {
        self.subscribers.subscribe(listener)
    }

    /// Remove a listener. Returns `false` if the key was unknown.
    pub fn unsubscribe(&mut self, key: SubscriptionKey) -> bool {
        self.subscribers.unsubscribe(key)
    }

    /// Backing storage.
    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }
}

fn save_session(storage: &mut impl Storage, session: &Session) -> Result<(), StorageError> {
    let user = serde_json::to_string(&session.user)?;

    storage.write(USER_KEY, &user)?;
    storage.write(TOKEN_KEY, &session.token)?;

    Ok(())
}

fn clear_slots(storage: &mut impl Storage) {
    for key in [TOKEN_KEY, USER_KEY] {
        if let Err(err) = storage.remove(key) {
            error!(key, error = %err, "failed to clear session slot");
        }
    }
}

fn read_slots(storage: &impl Storage) -> Result<(Option<String>, Option<String>), StorageError> {
    Ok((storage.read(TOKEN_KEY)?, storage.read(USER_KEY)?))
}

fn load_session(storage: &impl Storage) -> Option<Session> {
    match read_slots(storage) {
        Ok((Some(token), Some(user))) => match serde_json::from_str::<User>(&user) {
            Ok(user) => Some(Session { token, user }),
            Err(err) => {
                warn!(error = %err, "ignoring corrupt saved user");
                None
            }
        },
        Ok(_) => None,
        Err(err) => {
            warn!(error = %err, "failed to read saved session");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, io, rc::Rc};

    use mockall::predicate::eq;
    use testresult::TestResult;

    use crate::storage::{MemoryStorage, MockStorage};

    use super::*;

    fn io_failure(key: &str) -> StorageError {
        StorageError::Io {
            key: key.to_string(),
            source: io::Error::other("disk full"),
        }
    }

    /// Memory storage whose user slot cannot be written.
    #[derive(Debug, Clone)]
    struct ReadOnlyUserSlot(MemoryStorage);

    impl Storage for ReadOnlyUserSlot {
        fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.read(key)
        }

        fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            if key == USER_KEY {
                return Err(io_failure(key));
            }

            self.0.write(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            self.0.remove(key)
        }
    }

    fn other_customer() -> Session {
        Session {
            token: "tokB".to_string(),
            user: User {
                id: "u2".to_string(),
                name: "Baraka Mushi".to_string(),
                email: "baraka@example.com".to_string(),
                is_admin: false,
            },
        }
    }

    fn customer() -> Session {
        Session {
            token: "t0k3n".to_string(),
            user: User {
                id: "u1".to_string(),
                name: "Amina Juma Said".to_string(),
                email: "amina@example.com".to_string(),
                is_admin: false,
            },
        }
    }

    #[test]
    fn starts_signed_out() {
        let store = SessionStore::new(MemoryStorage::new());

        assert!(!store.is_signed_in());
        assert!(!store.is_admin());
        assert_eq!(store.authorization_header(), None);
    }

    #[test]
    fn sign_in_persists_and_restores() -> TestResult {
        let mut store = SessionStore::new(MemoryStorage::new());

        store.sign_in(customer());

        assert_eq!(store.authorization_header().as_deref(), Some("Bearer t0k3n"));
        assert_eq!(store.first_name(), Some("Amina"));
        assert_eq!(store.storage().get(TOKEN_KEY), Some("t0k3n"));

        let saved_user = store.storage().get(USER_KEY).unwrap_or_default();
        assert!(serde_json::from_str::<serde_json::Value>(saved_user)?.get("isAdmin").is_some());

        let restored = SessionStore::new(store.storage().clone());
        assert_eq!(restored.current(), Some(&customer()));

        Ok(())
    }

    #[test]
    fn sign_out_clears_slots() {
        let mut store = SessionStore::new(MemoryStorage::new());

        store.sign_in(customer());
        store.sign_out();

        assert!(!store.is_signed_in());
        assert_eq!(store.storage().get(TOKEN_KEY), None);
        assert_eq!(store.storage().get(USER_KEY), None);
    }

    #[test]
    fn subscribers_see_sign_in_and_out() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut store = SessionStore::new(MemoryStorage::new());

        let sink = Rc::clone(&seen);
        store.subscribe(move |change| sink.borrow_mut().push(change.clone()));

        store.sign_out();
        store.sign_in(customer());
        store.sign_out();

        assert_eq!(
            *seen.borrow(),
            [
                SessionChange::SignedIn(customer().user),
                SessionChange::SignedOut
            ]
        );
    }

    #[test]
    fn failed_user_write_clears_both_slots() {
        let mut storage = MockStorage::new();
        storage.expect_read().returning(|_| Ok(None));
        storage
            .expect_write()
            .withf(|key, _| key == USER_KEY)
            .times(1)
            .returning(|key, _| Err(io_failure(key)));
        storage
            .expect_write()
            .withf(|key, _| key == TOKEN_KEY)
            .never();
        storage
            .expect_remove()
            .with(eq(TOKEN_KEY))
            .times(1)
            .returning(|_| Ok(()));
        storage
            .expect_remove()
            .with(eq(USER_KEY))
            .times(1)
            .returning(|_| Ok(()));

        let mut store = SessionStore::new(storage);

        store.sign_in(customer());

        assert!(store.is_signed_in());
    }

    #[test]
    fn failed_sign_in_never_restores_previous_user() -> TestResult {
        let mut first = SessionStore::new(MemoryStorage::new());
        first.sign_in(customer());

        let mut second = SessionStore::new(ReadOnlyUserSlot(first.storage().clone()));
        second.sign_in(other_customer());

        assert_eq!(second.user(), Some(&other_customer().user));

        let reopened = SessionStore::new(second.storage().clone());

        assert_eq!(reopened.current(), None);
        assert_eq!(reopened.storage().read(TOKEN_KEY)?, None);

        Ok(())
    }

    #[test]
    fn sign_out_clears_orphaned_token() {
        let seen = Rc::new(RefCell::new(0));
        let mut store = SessionStore::new(MemoryStorage::with_value(TOKEN_KEY, "t0k3n"));

        let sink = Rc::clone(&seen);
        store.subscribe(move |_| *sink.borrow_mut() += 1);

        assert!(!store.is_signed_in());

        store.sign_out();

        assert_eq!(store.storage().get(TOKEN_KEY), None);
        assert_eq!(*seen.borrow(), 0);
    }

    #[test]
    fn token_without_user_is_signed_out() {
        let store = SessionStore::new(MemoryStorage::with_value(TOKEN_KEY, "t0k3n"));

        assert!(!store.is_signed_in());
    }

    #[test]
    fn corrupt_user_is_signed_out() -> TestResult {
        let mut storage = MemoryStorage::with_value(TOKEN_KEY, "t0k3n");
        storage.write(USER_KEY, "{\"name\":")?;

        let store = SessionStore::new(storage);

        assert!(!store.is_signed_in());

        Ok(())
    }

    #[test]
    fn backend_user_shape_is_accepted() -> TestResult {
        let user: User = serde_json::from_str(
            r#"{"_id":"65f0","name":"Admin","email":"admin@example.com","isAdmin":true}"#,
        )?;

        assert!(user.is_admin);
        assert_eq!(user.id, "65f0");

        Ok(())
    }
}
