use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::KeyValueStore;

/// A key-value store kept as a single JSON object on disk:
/// ```json
/// {
///   "courses": "[{\"id\":\"1717000000000\", ...}]",
///   "assignments": "[]"
/// }
/// ```
///
/// Values are the serialized collections themselves, so the file mirrors
/// the browser storage the tracker was first written against.
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens the store at `path`. A missing file is an empty store; an
    /// unreadable one is logged and treated as empty so the tracker still
    /// starts.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let entries = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read store '{}'", path.display()))?;
            match serde_json::from_str(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "Store file is corrupt, starting empty"
                    );
                    BTreeMap::new()
                }
            }
        } else {
            debug!(path = %path.display(), "Store file does not exist yet");
            BTreeMap::new()
        };

        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes the current entries, rolling them back to `previous` if the
    /// file cannot be written.
    fn commit(&mut self, previous: BTreeMap<String, String>) -> Result<()> {
        if let Err(e) = self.flush() {
            self.entries = previous;
            return Err(e);
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create '{}'", dir.display()))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        let body = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&tmp, body).with_context(|| format!("failed to write '{}'", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace '{}'", self.path.display()))?;

        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.set_many(vec![(key, value)])
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let previous = self.entries.clone();
        self.entries.remove(key);
        self.commit(previous)
    }

    /// Applies the whole batch and rewrites the file once.
    fn set_many(&mut self, entries: Vec<(&str, String)>) -> Result<()> {
        let previous = self.entries.clone();
        for (key, value) in entries {
            self.entries.insert(key.to_string(), value);
        }
        self.commit(previous)
    }
}
