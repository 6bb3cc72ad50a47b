//! Storage layer interface and implementations

#[cfg(test)]
pub mod memory;
pub mod sqlite;

use anyhow::Result;
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// String keys of the persisted documents. Kept verbatim from earlier
/// releases so existing stores keep working.
pub mod keys {
    pub const ISSUES: &str = "civictrack_issues";
    pub const USERS: &str = "civictrack_users";
    pub const SESSION: &str = "civictrack_current_user";
    pub const POSTS: &str = "community_posts";
    pub const ADMIN_ACTIONS: &str = "admin_actions";
    pub const ACTIVITIES: &str = "user_activities";
    pub const LOCATION: &str = "user_location";
    pub const THEME: &str = "civictrack_theme";
    pub const ID_SEQ: &str = "ct_id_seq";

    /// Key of a post's image blob.
    pub fn post_image(id: &str) -> String {
        format!("post_image_{id}")
    }
}

/// Storage trait defines the key-value document store every collection is
/// persisted in. Values are JSON documents; reads of an absent key return
/// `None`.
pub trait Storage: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn put(&self, key: &str, value: &str) -> Result<()>;
    fn delete(&self, key: &str) -> Result<()>;

    // Database path
    fn path(&self) -> &str;
}

/// Loads a JSON document, falling back to the default value when the key is
/// absent or its content does not parse. A parse failure is recoverable
/// state, not a crash: it is logged and the default returned.
pub fn load_doc<T>(store: &dyn Storage, key: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match store.get(key)? {
        None => Ok(T::default()),
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!("malformed document under {key:?}, starting empty: {err}");
                Ok(T::default())
            }
        },
    }
}

/// Loads an optional JSON document; absent and malformed both yield `None`.
pub fn load_opt<T>(store: &dyn Storage, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
{
    match store.get(key)? {
        None => Ok(None),
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                warn!("malformed document under {key:?}, ignoring: {err}");
                Ok(None)
            }
        },
    }
}

/// Serializes and writes a full document under its key.
pub fn save_doc<T>(store: &dyn Storage, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    store.put(key, &serde_json::to_string(value)?)
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryStorage;
    use super::*;
    use crate::types::Issue;

    #[test]
    fn load_doc_defaults_on_absent_key() {
        let store = MemoryStorage::new();
        let issues: Vec<Issue> = load_doc(&store, keys::ISSUES).unwrap();
        assert!(issues.is_empty());
    }

    #[test]
    fn load_doc_recovers_from_malformed_json() {
        let store = MemoryStorage::new();
        store.put(keys::ISSUES, "{definitely not json").unwrap();
        let issues: Vec<Issue> = load_doc(&store, keys::ISSUES).unwrap();
        assert!(issues.is_empty());
    }

    #[test]
    fn load_opt_ignores_malformed_json() {
        let store = MemoryStorage::new();
        store.put(keys::LOCATION, "[1, 2").unwrap();
        let loc: Option<crate::types::Coordinate> = load_opt(&store, keys::LOCATION).unwrap();
        assert!(loc.is_none());
    }

    #[test]
    fn save_doc_round_trips() {
        let store = MemoryStorage::new();
        save_doc(&store, keys::ID_SEQ, &42u64).unwrap();
        let seq: u64 = load_doc(&store, keys::ID_SEQ).unwrap();
        assert_eq!(seq, 42);
    }
}
