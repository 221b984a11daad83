use tracing::{debug, warn};

use super::storage::Storage;
use super::SessionError;
use crate::models::User;

/// Storage key holding the serialized [`User`].
pub const USER_KEY: &str = "user";

/// The signed-in user, mirrored to a [`Storage`] backend.
///
/// Nothing is global: callers own a store and pass it to whatever needs the
/// session.
#[derive(Debug)]
pub struct SessionStore<S: Storage> {
    storage: S,
    user: Option<User>,
}

impl<S: Storage> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            user: None,
        }
    }

    /// Restore the cached user, if any. An unreadable entry is discarded.
    pub fn load(&mut self) -> Result<Option<&User>, SessionError> {
        self.user = match self.storage.get(USER_KEY)? {
            None => None,
            Some(raw) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!(kind = "payload", error = %e, "Discarding unreadable cached user");
                    self.storage.remove(USER_KEY)?;
                    None
                }
            },
        };
        debug!(present = self.user.is_some(), "Loaded session");
        Ok(self.user.as_ref())
    }

    pub fn save(&mut self, user: User) -> Result<(), SessionError> {
        self.storage.set(USER_KEY, serde_json::to_string(&user)?)?;
        self.user = Some(user);
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), SessionError> {
        self.storage.remove(USER_KEY)?;
        self.user = None;
        Ok(())
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}
