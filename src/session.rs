//! Session guard: who is logged in, and whether the account is enabled.
//!
//! The session is four string-valued entries in a key-value store, using
//! the same key names the browser client kept in localStorage. A session
//! is valid only when all four are present and well-formed AND the enable
//! flag is true; anything less is treated as no session at all.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::{PennyError, Result};

pub const KEY_TOKEN: &str = "accessToken";
pub const KEY_USERNAME: &str = "username";
pub const KEY_EMAIL: &str = "email";
pub const KEY_ENABLE: &str = "enable";

const SESSION_KEYS: [&str; 4] = [KEY_TOKEN, KEY_USERNAME, KEY_EMAIL, KEY_ENABLE];

/// Key names written by older versions of the client, purged on clear.
const LEGACY_KEYS: [&str; 2] = ["token", "user"];

/// Persistent string key-value storage for the session record. The guard
/// depends on this interface rather than a concrete file so tests can
/// substitute an in-memory fake.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    /// Persist every entry as a single unit; readers must never observe a
    /// partial write.
    fn set_all(&mut self, entries: &[(&str, &str)]) -> Result<()>;
    /// Remove the given keys. Missing keys are not an error, and removal
    /// itself must not fail.
    fn remove_all(&mut self, keys: &[&str]);
}

/// File-backed store: one JSON object of string fields. Writes go to a
/// sibling temp file first and land via rename, so a reader sees either
/// the old record or the new one, never a torn write.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn open_default() -> Self {
        Self::new(crate::settings::session_path())
    }

    fn read_map(&self) -> BTreeMap<String, String> {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(map)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_map().get(key).cloned()
    }

    fn set_all(&mut self, entries: &[(&str, &str)]) -> Result<()> {
        let mut map = self.read_map();
        for (k, v) in entries {
            map.insert((*k).to_string(), (*v).to_string());
        }
        self.write_map(&map)
    }

    fn remove_all(&mut self, keys: &[&str]) {
        let mut map = self.read_map();
        let before = map.len();
        for k in keys {
            map.remove(*k);
        }
        if map.len() != before {
            // clear must never fail; a write error here just leaves the
            // old file, which the next write replaces
            let _ = self.write_map(&map);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub username: String,
    pub email: String,
    pub enabled: bool,
}

/// Persist a session record. All four fields are written atomically;
/// empty token/username/email is rejected before anything is stored.
pub fn save_session(
    store: &mut dyn SessionStore,
    token: &str,
    username: &str,
    email: &str,
    enabled: bool,
) -> Result<()> {
    if token.is_empty() || username.is_empty() || email.is_empty() {
        return Err(PennyError::InvalidSessionData(
            "token, username and email are all required".to_string(),
        ));
    }
    let enable = if enabled { "true" } else { "false" };
    store.set_all(&[
        (KEY_TOKEN, token),
        (KEY_USERNAME, username),
        (KEY_EMAIL, email),
        (KEY_ENABLE, enable),
    ])
}

/// Read the session record. Returns `None` unless every field is present
/// and the enable flag parses to a boolean; a partial record is never
/// surfaced as partially-authenticated.
pub fn load_session(store: &dyn SessionStore) -> Option<Session> {
    let access_token = store.get(KEY_TOKEN)?;
    let username = store.get(KEY_USERNAME)?;
    let email = store.get(KEY_EMAIL)?;
    let enable = store.get(KEY_ENABLE)?;
    if access_token.is_empty() || username.is_empty() || email.is_empty() {
        return None;
    }
    let enabled = match enable.as_str() {
        "true" => true,
        "false" => false,
        _ => return None,
    };
    Some(Session {
        access_token,
        username,
        email,
        enabled,
    })
}

pub fn is_authenticated(store: &dyn SessionStore) -> bool {
    load_session(store).map(|s| s.enabled).unwrap_or(false)
}

/// Remove the session record unconditionally, legacy keys included.
pub fn clear_session(store: &mut dyn SessionStore) {
    let mut keys: Vec<&str> = SESSION_KEYS.to_vec();
    keys.extend(LEGACY_KEYS);
    store.remove_all(&keys);
}

/// Route-guard state: `Checking` before the store has been consulted,
/// then resolved one way or the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    Checking,
    Authenticated(Session),
    Unauthenticated,
}

impl GuardState {
    pub fn evaluate(store: &dyn SessionStore) -> Self {
        match load_session(store) {
            Some(s) if s.enabled => GuardState::Authenticated(s),
            _ => GuardState::Unauthenticated,
        }
    }
}

/// Gate for protected commands. Re-evaluated on every invocation, never
/// cached, since logout or a server-side invalidation can happen between
/// commands.
pub fn require(store: &dyn SessionStore) -> Result<Session> {
    match GuardState::evaluate(store) {
        GuardState::Authenticated(s) => Ok(s),
        _ => Err(PennyError::AuthenticationFailure),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MemoryStore {
        map: BTreeMap<String, String>,
    }

    impl SessionStore for MemoryStore {
        fn get(&self, key: &str) -> Option<String> {
            self.map.get(key).cloned()
        }

        fn set_all(&mut self, entries: &[(&str, &str)]) -> Result<()> {
            for (k, v) in entries {
                self.map.insert((*k).to_string(), (*v).to_string());
            }
            Ok(())
        }

        fn remove_all(&mut self, keys: &[&str]) {
            for k in keys {
                self.map.remove(*k);
            }
        }
    }

    fn saved_store() -> MemoryStore {
        let mut store = MemoryStore::default();
        save_session(&mut store, "tok-123", "alice", "alice@example.com", true).unwrap();
        store
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let store = saved_store();
        let s = load_session(&store).unwrap();
        assert_eq!(s.access_token, "tok-123");
        assert_eq!(s.username, "alice");
        assert_eq!(s.email, "alice@example.com");
        assert!(s.enabled);
        assert!(is_authenticated(&store));
    }

    #[test]
    fn test_disabled_session_loads_but_is_not_authenticated() {
        let mut store = MemoryStore::default();
        save_session(&mut store, "tok", "bob", "bob@example.com", false).unwrap();
        let s = load_session(&store).unwrap();
        assert!(!s.enabled);
        assert!(!is_authenticated(&store));
        assert!(require(&store).is_err());
    }

    #[test]
    fn test_any_missing_field_means_absent() {
        for missing in SESSION_KEYS {
            let mut store = saved_store();
            store.remove_all(&[missing]);
            assert!(load_session(&store).is_none(), "missing {missing}");
            assert!(!is_authenticated(&store), "missing {missing}");
        }
    }

    #[test]
    fn test_malformed_enable_flag_means_absent() {
        let mut store = saved_store();
        store.set_all(&[(KEY_ENABLE, "yes")]).unwrap();
        assert!(load_session(&store).is_none());
        assert!(!is_authenticated(&store));
    }

    #[test]
    fn test_empty_fields_rejected_on_save() {
        let mut store = MemoryStore::default();
        let err = save_session(&mut store, "", "alice", "a@b.c", true).unwrap_err();
        assert!(matches!(err, PennyError::InvalidSessionData(_)));
        // Nothing was written
        assert!(load_session(&store).is_none());
    }

    #[test]
    fn test_clear_then_load_is_absent() {
        let mut store = saved_store();
        clear_session(&mut store);
        assert!(load_session(&store).is_none());
        assert!(!is_authenticated(&store));
    }

    #[test]
    fn test_clear_purges_legacy_keys() {
        let mut store = saved_store();
        store.set_all(&[("token", "old"), ("user", "old-user")]).unwrap();
        clear_session(&mut store);
        assert!(store.get("token").is_none());
        assert!(store.get("user").is_none());
    }

    #[test]
    fn test_guard_state_transitions() {
        let mut store = MemoryStore::default();
        assert_eq!(GuardState::evaluate(&store), GuardState::Unauthenticated);
        save_session(&mut store, "t", "u", "e@x.y", true).unwrap();
        assert!(matches!(GuardState::evaluate(&store), GuardState::Authenticated(_)));
        clear_session(&mut store);
        assert_eq!(GuardState::evaluate(&store), GuardState::Unauthenticated);
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("session.json"));
        save_session(&mut store, "tok", "carol", "carol@example.com", true).unwrap();

        // A second handle over the same path sees the record
        let reader = FileStore::new(dir.path().join("session.json"));
        let s = load_session(&reader).unwrap();
        assert_eq!(s.username, "carol");
        assert!(is_authenticated(&reader));

        clear_session(&mut store);
        assert!(load_session(&reader).is_none());
    }

    #[test]
    fn test_file_store_ignores_garbage_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json at all").unwrap();
        let store = FileStore::new(path);
        assert!(load_session(&store).is_none());
    }
}
