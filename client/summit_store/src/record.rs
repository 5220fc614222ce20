//! Versioned JSON envelope.
//!
//! Every value is written as `{"version": N, "data": ...}`. Decoding accepts
//! envelopes from newer writers (unknown fields are ignored by the record
//! types) and bare legacy JSON written before envelopes existed.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::storage::{KeyValueStore, StorageKey};

/// Current envelope version.
pub const RECORD_VERSION: u32 = 1;

#[derive(Serialize)]
struct Envelope<'a, T> {
    version: u32,
    data: &'a T,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Stored<T> {
    Versioned { version: u32, data: T },
    Legacy(T),
}

pub fn encode<T: Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string(&Envelope {
        version: RECORD_VERSION,
        data: value,
    })
}

pub fn decode<T: DeserializeOwned>(raw: &str) -> serde_json::Result<T> {
    match serde_json::from_str::<Stored<T>>(raw)? {
        Stored::Versioned { version, data } => {
            if version > RECORD_VERSION {
                debug!(version, "decoded record from a newer writer");
            }
            Ok(data)
        }
        Stored::Legacy(data) => Ok(data),
    }
}

/// Typed, namespaced access to a [`KeyValueStore`].
///
/// Failures are logged and swallowed: reads yield `None`, writes become
/// no-ops.
#[derive(Debug)]
pub struct RecordStore<S> {
    backend: S,
    namespace: String,
}

impl<S: KeyValueStore> RecordStore<S> {
    pub fn new(backend: S, namespace: impl Into<String>) -> Self {
        Self {
            backend,
            namespace: namespace.into(),
        }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn key(&self, kind: StorageKey, user: &str) -> String {
        kind.scoped(&self.namespace, user)
    }

    pub fn read<T: DeserializeOwned>(&self, kind: StorageKey, user: &str) -> Option<T> {
        let key = self.key(kind, user);
        let raw = match self.backend.get(&key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(%key, error = %e, "storage read failed");
                return None;
            }
        };
        match decode(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(%key, error = %e, "discarding corrupt record");
                None
            }
        }
    }

    /// Read a list record, treating missing or unreadable data as empty.
    pub fn read_list<T: DeserializeOwned>(&self, kind: StorageKey, user: &str) -> Vec<T> {
        self.read(kind, user).unwrap_or_default()
    }

    /// Returns whether the write reached the backend.
    pub fn write<T: Serialize>(&self, kind: StorageKey, user: &str, value: &T) -> bool {
        let key = self.key(kind, user);
        let raw = match encode(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(%key, error = %e, "failed to encode record");
                return false;
            }
        };
        match self.backend.set(&key, &raw) {
            Ok(()) => true,
            Err(e) => {
                warn!(%key, error = %e, "storage write failed");
                false
            }
        }
    }

    pub fn remove(&self, kind: StorageKey, user: &str) {
        let key = self.key(kind, user);
        if let Err(e) = self.backend.remove(&key) {
            warn!(%key, error = %e, "storage remove failed");
        }
    }
}
