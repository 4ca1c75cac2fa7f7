//! Session state backed by persisted slots
//!
//! [`SessionStore`] is the only owner of the in-memory session. It is
//! initialized from the persisted credential and user at startup and torn
//! down on logout or as soon as an expired credential is noticed.
//!
//! Teardown always runs in the same order: persisted slots are cleared
//! first, then the in-memory state is reset, and only then does navigation
//! happen. Anyone observing the store in between never sees a logged-in
//! session over cleared storage.

use std::sync::{Arc, PoisonError, RwLock};

use common::{
    ClientConfig, SlotStore, UserSummary,
    storage::{read_json, write_json},
};
use tracing::{error, info, warn};

use crate::{
    credential,
    error::{SessionError, SessionResult},
    guard::Navigator,
};

/// In-memory session state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub is_logged_in: bool,
    pub user: Option<UserSummary>,
}

impl Session {
    pub fn logged_out() -> Self {
        Self::default()
    }
}

/// Names of the persisted slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotKeys {
    pub credential: String,
    pub user: String,
}

impl Default for SlotKeys {
    fn default() -> Self {
        Self {
            credential: "token".to_string(),
            user: "user".to_string(),
        }
    }
}

impl SlotKeys {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            credential: config.credential_key.clone(),
            user: config.user_key.clone(),
        }
    }
}

/// Owner of the process-wide session
pub struct SessionStore {
    storage: Arc<dyn SlotStore>,
    keys: SlotKeys,
    state: RwLock<Session>,
}

impl SessionStore {
    /// Create a store over the given slots. The session starts logged out
    /// until [`SessionStore::initialize`] runs.
    pub fn new(storage: Arc<dyn SlotStore>, keys: SlotKeys) -> Self {
        Self {
            storage,
            keys,
            state: RwLock::new(Session::logged_out()),
        }
    }

    /// Restore the session from the persisted slots
    ///
    /// No network round trip happens here: a valid credential restores the
    /// cached user as is.
    pub fn initialize(&self) -> Session {
        let token = self.stored_credential();
        if !credential::is_valid(token.as_deref()) {
            if token.is_some() {
                info!("Persisted credential is no longer valid, clearing session");
            }
            self.teardown();
            return Session::logged_out();
        }

        let user = match read_json::<UserSummary>(self.storage.as_ref(), &self.keys.user) {
            Ok(user) => user,
            Err(e) => {
                warn!("Ignoring cached user: {}", e);
                None
            }
        };

        let session = Session {
            is_logged_in: true,
            user,
        };
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = session.clone();
        info!("Session restored from persisted credential");
        session
    }

    /// Snapshot of the current session
    pub fn session(&self) -> Session {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Persist a freshly issued credential and user, then log in
    pub fn login(&self, token: &str, user: &UserSummary) -> SessionResult<Session> {
        if !credential::is_valid(Some(token)) {
            return Err(SessionError::InvalidCredential);
        }

        self.storage.set(&self.keys.credential, token)?;
        write_json(self.storage.as_ref(), &self.keys.user, user)?;

        let session = Session {
            is_logged_in: true,
            user: Some(user.clone()),
        };
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = session.clone();
        info!("User {} logged in", user.username);
        Ok(session)
    }

    /// Replace the cached user, e.g. after refetching the profile
    pub fn set_user(&self, user: UserSummary) -> SessionResult<()> {
        if !self.is_authenticated() {
            return Err(SessionError::InvalidCredential);
        }
        write_json(self.storage.as_ref(), &self.keys.user, &user)?;
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .user = Some(user);
        Ok(())
    }

    /// The credential to present to the API, if it is still valid
    pub fn bearer(&self) -> Option<String> {
        let token = self.stored_credential();
        if credential::is_valid(token.as_deref()) {
            token
        } else {
            self.expire_if_logged_in();
            None
        }
    }

    /// Whether the persisted credential is valid right now
    pub fn is_authenticated(&self) -> bool {
        self.bearer().is_some()
    }

    /// Tear the session down without navigating
    pub fn expire(&self) {
        info!("Session expired");
        self.teardown();
    }

    /// Log out and navigate to `login_path`
    pub fn logout(&self, navigator: &dyn Navigator, login_path: &str) {
        info!("Logging out");
        self.teardown();
        navigator.navigate(login_path);
    }

    fn expire_if_logged_in(&self) {
        let logged_in = self
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_logged_in;
        if logged_in {
            self.expire();
        }
    }

    fn stored_credential(&self) -> Option<String> {
        match self.storage.get(&self.keys.credential) {
            Ok(token) => token,
            Err(e) => {
                error!("Failed to read persisted credential: {}", e);
                None
            }
        }
    }

    fn teardown(&self) {
        for key in [&self.keys.credential, &self.keys.user] {
            if let Err(e) = self.storage.delete(key) {
                error!("Failed to clear slot '{}': {}", key, e);
            }
        }
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = Session::logged_out();
    }
}
