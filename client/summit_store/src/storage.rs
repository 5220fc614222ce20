//! Key-value backends.

use std::cell::RefCell;
use std::collections::HashMap;

/// Backend failures. Callers above [`crate::RecordStore`] never see these.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Writing would exceed the backend's quota.
    #[error("storage quota exceeded: {used} of {limit} bytes")]
    QuotaExceeded { used: usize, limit: usize },

    /// Any other backend failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// String-keyed, string-valued storage with last-write-wins semantics.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Record kinds persisted by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    ActiveSession,
    ClimbHistory,
    Reservations,
    SummitVerifications,
    UserNfts,
}

impl StorageKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::ActiveSession => "active_session",
            StorageKey::ClimbHistory => "climb_history",
            StorageKey::Reservations => "reservations",
            StorageKey::SummitVerifications => "summit_verifications",
            StorageKey::UserNfts => "user_nfts",
        }
    }

    /// Full key, e.g. `summit:reservations:GABC...`.
    pub fn scoped(&self, namespace: &str, user: &str) -> String {
        format!("{}:{}:{}", namespace, self.as_str(), user.to_lowercase())
    }
}

/// In-memory backend with an optional byte quota.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes once keys plus values would exceed `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
            quota: Some(bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn used_without(&self, key: &str) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(limit) = self.quota {
            let used = self.used_without(key) + key.len() + value.len();
            if used > limit {
                return Err(StorageError::QuotaExceeded { used, limit });
            }
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Browser `localStorage`.
#[cfg(feature = "web")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

#[cfg(feature = "web")]
impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        use gloo_storage::Storage as _;
        gloo_storage::LocalStorage::raw()
            .get_item(key)
            .map_err(|e| StorageError::Backend(format!("{:?}", e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        use gloo_storage::Storage as _;
        gloo_storage::LocalStorage::raw()
            .set_item(key, value)
            .map_err(|e| StorageError::Backend(format!("{:?}", e)))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        use gloo_storage::Storage as _;
        gloo_storage::LocalStorage::raw()
            .remove_item(key)
            .map_err(|e| StorageError::Backend(format!("{:?}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced_per_user() {
        assert_eq!(
            StorageKey::Reservations.scoped("summit", "GABC"),
            "summit:reservations:gabc"
        );
        assert_ne!(
            StorageKey::ActiveSession.scoped("summit", "a"),
            StorageKey::ClimbHistory.scoped("summit", "a")
        );
    }

    #[test]
    fn last_write_wins() {
        let storage = MemoryStorage::new();
        storage.set("k", "one").unwrap();
        storage.set("k", "two").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("two"));
        storage.remove("k").unwrap();
        assert!(storage.get("k").unwrap().is_none());
    }

    #[test]
    fn quota_rejects_oversized_writes() {
        let storage = MemoryStorage::with_quota(10);
        storage.set("k", "12345").unwrap();
        // overwriting the same key only counts the new value
        storage.set("k", "123456789").unwrap();
        assert!(matches!(
            storage.set("other", "x"),
            Err(StorageError::QuotaExceeded { limit: 10, .. })
        ));
    }
}
