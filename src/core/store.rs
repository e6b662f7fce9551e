//! Persistent session state: the bearer token and the cached user profile.
//!
//! These are the only two pieces of client state that survive a restart.
//! Access goes through the [`SessionStore`] trait so the chat and auth
//! layers never touch the keyring or the filesystem directly, and tests can
//! substitute an in-memory store.

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use keyring::Entry;

use crate::core::message::User;

const KEYRING_SERVICE: &str = "maum";
const KEYRING_TOKEN_ENTRY: &str = "api-token";
const USER_CACHE_FILE: &str = "user.json";

pub trait SessionStore: Send + Sync {
    fn token(&self) -> Option<String>;
    fn set_token(&self, token: &str) -> Result<(), Box<dyn Error>>;
    fn cached_user(&self) -> Option<User>;
    fn set_cached_user(&self, user: &User) -> Result<(), Box<dyn Error>>;
    /// Remove both the token and the cached user. Failures are swallowed:
    /// a session clear must always leave the client logged out.
    fn clear_session(&self);
}

/// Token in the system keyring, cached user as JSON next to the config file.
pub struct KeyringSessionStore {
    user_path: PathBuf,
}

impl KeyringSessionStore {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        let config_dir = crate::core::config::config_dir()?;
        fs::create_dir_all(&config_dir)?;
        Ok(KeyringSessionStore {
            user_path: config_dir.join(USER_CACHE_FILE),
        })
    }

    fn entry() -> Result<Entry, keyring::Error> {
        Entry::new(KEYRING_SERVICE, KEYRING_TOKEN_ENTRY)
    }
}

impl SessionStore for KeyringSessionStore {
    fn token(&self) -> Option<String> {
        Self::entry().ok()?.get_password().ok()
    }

    fn set_token(&self, token: &str) -> Result<(), Box<dyn Error>> {
        Self::entry()?.set_password(token)?;
        Ok(())
    }

    fn cached_user(&self) -> Option<User> {
        let contents = fs::read_to_string(&self.user_path).ok()?;
        serde_json::from_str(&contents).ok()
    }

    fn set_cached_user(&self, user: &User) -> Result<(), Box<dyn Error>> {
        let contents = serde_json::to_string_pretty(user)?;
        fs::write(&self.user_path, contents)?;
        Ok(())
    }

    fn clear_session(&self) {
        if let Ok(entry) = Self::entry() {
            let _ = entry.delete_credential();
        }
        let _ = fs::remove_file(&self.user_path);
    }
}
