//! Flat key-value persistence for the gradebook collections.
//!
//! Each collection is stored as one JSON array under its own key. Reading
//! falls back to an empty collection when the key is missing or the stored
//! text no longer parses.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use anyhow::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

pub const COURSES_KEY: &str = "courses";
pub const ASSIGNMENTS_KEY: &str = "assignments";

/// String-keyed storage holding serialized values.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;

    /// Writes every entry or none of them.
    ///
    /// The default writes one key at a time and puts back the earlier
    /// values if a later write fails. Stores that can commit a batch in one
    /// step should override it.
    fn set_many(&mut self, entries: Vec<(&str, String)>) -> Result<()> {
        let mut written: Vec<(&str, Option<String>)> = Vec::new();

        for (key, value) in entries {
            let previous = self.get(key)?;
            if let Err(e) = self.set(key, value) {
                for (key, previous) in written.into_iter().rev() {
                    let restored = match previous {
                        Some(previous) => self.set(key, previous),
                        None => self.remove(key),
                    };
                    if let Err(restore_err) = restored {
                        warn!(
                            key,
                            error = %restore_err,
                            "Failed to restore entry after a failed write"
                        );
                    }
                }
                return Err(e);
            }
            written.push((key, previous));
        }

        Ok(())
    }
}

/// Reads the collection stored under `key`, or an empty one if it is absent
/// or unreadable.
pub fn load_collection<T, S>(store: &S, key: &str) -> Vec<T>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(key, "No stored collection, starting empty");
            return Vec::new();
        }
        Err(e) => {
            warn!(key, error = %e, "Failed to read stored collection, starting empty");
            return Vec::new();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(items) => items,
        Err(e) => {
            warn!(key, error = %e, "Stored collection is corrupt, starting empty");
            Vec::new()
        }
    }
}

/// Serializes `items` as the JSON array stored under `key`.
pub fn encode_collection<T: Serialize>(key: &str, items: &[T]) -> Result<String> {
    let raw = serde_json::to_string(items)?;
    debug!(key, count = items.len(), bytes = raw.len(), "Encoded collection");
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_key_is_empty() {
        let store = MemoryStore::default();
        let items: Vec<u32> = load_collection(&store, COURSES_KEY);
        assert!(items.is_empty());
    }

    #[test]
    fn test_load_corrupt_value_is_empty() {
        let mut store = MemoryStore::default();
        store.set(COURSES_KEY, "{not json".to_string()).unwrap();

        let items: Vec<u32> = load_collection(&store, COURSES_KEY);
        assert!(items.is_empty());
    }

    #[test]
    fn test_load_wrong_shape_is_empty() {
        let mut store = MemoryStore::default();
        store.set(ASSIGNMENTS_KEY, r#"{"id": "1"}"#.to_string()).unwrap();

        let items: Vec<u32> = load_collection(&store, ASSIGNMENTS_KEY);
        assert!(items.is_empty());
    }

    #[test]
    fn test_encode_then_load() {
        let mut store = MemoryStore::default();
        let raw = encode_collection(COURSES_KEY, &[3u32, 1, 2]).unwrap();
        store.set(COURSES_KEY, raw).unwrap();

        assert_eq!(store.get(COURSES_KEY).unwrap().as_deref(), Some("[3,1,2]"));
        let items: Vec<u32> = load_collection(&store, COURSES_KEY);
        assert_eq!(items, vec![3, 1, 2]);
    }

    /// Accepts writes until `fail_on` is reached.
    struct FlakyStore {
        inner: MemoryStore,
        fail_on: &'static str,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: String) -> Result<()> {
            if key == self.fail_on {
                anyhow::bail!("disk full");
            }
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_set_many_writes_all() {
        let mut store = MemoryStore::default();
        store
            .set_many(vec![
                (COURSES_KEY, "[1]".to_string()),
                (ASSIGNMENTS_KEY, "[2]".to_string()),
            ])
            .unwrap();

        assert_eq!(store.get(COURSES_KEY).unwrap().as_deref(), Some("[1]"));
        assert_eq!(store.get(ASSIGNMENTS_KEY).unwrap().as_deref(), Some("[2]"));
    }

    #[test]
    fn test_set_many_restores_previous_value_on_failure() {
        let mut inner = MemoryStore::default();
        inner.set(COURSES_KEY, "[\"old\"]".to_string()).unwrap();
        let mut store = FlakyStore {
            inner,
            fail_on: ASSIGNMENTS_KEY,
        };

        let result = store.set_many(vec![
            (COURSES_KEY, "[]".to_string()),
            (ASSIGNMENTS_KEY, "[]".to_string()),
        ]);

        assert!(result.is_err());
        assert_eq!(store.get(COURSES_KEY).unwrap().as_deref(), Some("[\"old\"]"));
        assert_eq!(store.get(ASSIGNMENTS_KEY).unwrap(), None);
    }

    #[test]
    fn test_set_many_removes_new_key_on_failure() {
        let mut store = FlakyStore {
            inner: MemoryStore::default(),
            fail_on: ASSIGNMENTS_KEY,
        };

        let result = store.set_many(vec![
            (COURSES_KEY, "[]".to_string()),
            (ASSIGNMENTS_KEY, "[]".to_string()),
        ]);

        assert!(result.is_err());
        assert_eq!(store.get(COURSES_KEY).unwrap(), None);
    }
}
