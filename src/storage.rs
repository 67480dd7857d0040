//! Durable client-side key/value storage.
//!
//! DESIGN
//! ======
//! Exactly one key matters to the client: [`TOKEN_KEY`], holding the bearer
//! token. Absence means anonymous. Storage is synchronous because the
//! outbound interceptor reads it on every request and must not await.
//!
//! TRADE-OFFS
//! ==========
//! `FileStorage` keeps the whole map in memory and rewrites the file on each
//! mutation. The map is tiny, and a temp-file rename keeps a crash from
//! leaving half a token on disk. On unix the file is owner-only (0600). Write failures are logged, not returned:
//! losing persistence degrades to a session that ends with the process.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::warn;

/// Storage key for the persisted bearer token.
pub const TOKEN_KEY: &str = "token";

/// Synchronous string key/value store that outlives the process.
pub trait TokenStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

// =============================================================================
// MEMORY
// =============================================================================

/// Process-local storage. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with a persisted token.
    #[must_use]
    pub fn with_token(token: &str) -> Self {
        let storage = Self::new();
        storage.set(TOKEN_KEY, token);
        storage
    }
}

impl TokenStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.remove(key);
    }
}

// =============================================================================
// FILE
// =============================================================================

/// JSON-object file storage, e.g. `{"token": "eyJ..."}`.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open `path`, reading existing entries. A missing or unreadable file
    /// starts empty.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_entries(&path);
        Self { path, entries: Mutex::new(entries) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn mutate(&self, apply: impl FnOnce(&mut BTreeMap<String, String>)) {
        let mut entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        apply(&mut entries);
        if let Err(e) = write_entries(&self.path, &entries) {
            warn!(error = %e, path = %self.path.display(), "storage: persist failed");
        }
    }
}

impl TokenStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.mutate(|entries| {
            entries.insert(key.to_owned(), value.to_owned());
        });
    }

    fn remove(&self, key: &str) {
        self.mutate(|entries| {
            entries.remove(key);
        });
    }
}

fn load_entries(path: &Path) -> BTreeMap<String, String> {
    let raw = match std::fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
        Err(e) => {
            warn!(error = %e, path = %path.display(), "storage: read failed; starting empty");
            return BTreeMap::new();
        }
    };
    serde_json::from_slice(&raw).unwrap_or_else(|e| {
        warn!(error = %e, path = %path.display(), "storage: corrupt file; starting empty");
        BTreeMap::new()
    })
}

fn write_entries(path: &Path, entries: &BTreeMap<String, String>) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_vec_pretty(entries).map_err(std::io::Error::other)?;
    // Per-write temp name: concurrent writers never share a partial file.
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(format!(".{}.tmp", uuid::Uuid::new_v4()));
    let tmp = PathBuf::from(tmp);
    if let Err(e) = write_private(&tmp, &json).and_then(|()| std::fs::rename(&tmp, path)) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}

/// Owner-only on unix; the rename keeps the mode.
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}
