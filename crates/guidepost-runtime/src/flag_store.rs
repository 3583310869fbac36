#![forbid(unsafe_code)]

//! Durable boolean flags for "do not show again" bookkeeping.
//!
//! This module provides the [`FlagRegistry`] and [`StorageBackend`] infrastructure
//! for persisting walkthrough flags (`tour-completed`, `welcome-shown`, ...).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      FlagRegistry                             │
//! │   - In-memory cache of flag entries                           │
//! │   - Delegates to StorageBackend for persistence               │
//! │   - Provides get/set/flush/clear operations                   │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     StorageBackend                            │
//! │   - MemoryStorage: in-memory (testing, ephemeral)             │
//! │   - FileStorage: JSON file (requires state-persistence)       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Invariants
//!
//! 1. **Graceful degradation**: Storage failures never panic; operations return `Result`.
//! 2. **Atomic writes**: File storage uses write-rename pattern to prevent corruption.
//! 3. **Missing means false**: An absent key reads as `false`.
//! 4. **Cache first**: A failed flush leaves the cached value in place, so the
//!    running process still honours the flag.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `StorageError::Io` | File I/O failure | Returns error, cache unaffected |
//! | `StorageError::Serialization` | File is not a flag document | Returns error, cache unaffected |
//! | Malformed entry | One flag hand-edited or truncated | Entry skipped with a warning, others load |
//! | `StorageError::Corruption` | Lock poisoned | Returns error |
//! | Missing entry | First run, key changed | Reads as `false` |

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur during flag storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error during file operations.
    Io(std::io::Error),
    /// Serialization or deserialization error.
    #[cfg(feature = "state-persistence")]
    Serialization(String),
    /// Storage is corrupted or a lock was poisoned.
    Corruption(String),
    /// Backend is not available (e.g., file storage without feature).
    Unavailable(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "state-persistence")]
            StorageError::Serialization(msg) => write!(f, "serialization error: {msg}"),
            StorageError::Corruption(msg) => write!(f, "storage corruption: {msg}"),
            StorageError::Unavailable(msg) => write!(f, "storage unavailable: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Milliseconds since the Unix epoch, or 0 if the clock is before it.
pub fn now_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ─────────────────────────────────────────────────────────────────────────────
// Storage Backend Trait
// ─────────────────────────────────────────────────────────────────────────────

/// A stored flag with the time it was last written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlagEntry {
    /// The flag key.
    pub key: String,
    /// Current value.
    pub value: bool,
    /// When the value was written (unix milliseconds).
    pub updated_at_ms: u64,
}

/// Trait for pluggable flag storage backends.
///
/// Implementations must be thread-safe (`Send + Sync`) so the registry can be
/// shared with the host application.
pub trait StorageBackend: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Load all stored entries.
    ///
    /// Returns an empty map if nothing has been stored yet (first run).
    fn load_all(&self) -> StorageResult<HashMap<String, FlagEntry>>;

    /// Save all entries atomically, replacing existing contents.
    fn save_all(&self, entries: &HashMap<String, FlagEntry>) -> StorageResult<()>;

    /// Clear all stored flags.
    fn clear(&self) -> StorageResult<()>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Storage (always available)
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory storage backend for testing and ephemeral state.
///
/// Clones share the same underlying map, so a test can hand one clone to a
/// registry, drop the registry, and build a fresh one over another clone to
/// simulate an application restart.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    data: Arc<RwLock<HashMap<String, FlagEntry>>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn name(&self) -> &str {
        "MemoryStorage"
    }

    fn load_all(&self) -> StorageResult<HashMap<String, FlagEntry>> {
        let guard = self
            .data
            .read()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        Ok(guard.clone())
    }

    fn save_all(&self, entries: &HashMap<String, FlagEntry>) -> StorageResult<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        *guard = entries.clone();
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        guard.clear();
        Ok(())
    }
}

impl fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.data.read().map(|g| g.len()).unwrap_or(0);
        f.debug_struct("MemoryStorage")
            .field("entries", &count)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Storage (requires state-persistence feature)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "state-persistence")]
mod file_storage {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::fs::{self, File};
    use std::io::{BufReader, BufWriter, Write};
    use std::path::{Path, PathBuf};

    /// File format for stored flags (JSON).
    #[derive(Serialize)]
    struct FlagFile {
        /// Format version for future migrations.
        format_version: u32,
        /// Map of key -> entry.
        flags: HashMap<String, FileEntry>,
    }

    /// On-disk shape as read back. Entries stay raw so one malformed flag
    /// cannot take the well-formed ones down with it.
    #[derive(Deserialize)]
    struct RawFlagFile {
        format_version: u32,
        #[serde(default)]
        flags: HashMap<String, serde_json::Value>,
    }

    #[derive(Serialize, Deserialize)]
    struct FileEntry {
        value: bool,
        #[serde(default)]
        updated_at_ms: u64,
    }

    impl FlagFile {
        const FORMAT_VERSION: u32 = 1;

        fn new() -> Self {
            Self {
                format_version: Self::FORMAT_VERSION,
                flags: HashMap::new(),
            }
        }
    }

    /// File-based storage backend using JSON.
    ///
    /// # File Format
    ///
    /// ```json
    /// {
    ///   "format_version": 1,
    ///   "flags": {
    ///     "tour-completed": { "value": true, "updated_at_ms": 1760000000000 }
    ///   }
    /// }
    /// ```
    ///
    /// # Atomic Writes
    ///
    /// 1. Write to `{path}.tmp`
    /// 2. Flush and sync
    /// 3. Rename `{path}.tmp` -> `{path}`
    pub struct FileStorage {
        path: PathBuf,
    }

    impl FileStorage {
        /// Create a file storage at the given path.
        ///
        /// The file does not need to exist; it will be created on first save.
        #[must_use]
        pub fn new(path: impl AsRef<Path>) -> Self {
            Self {
                path: path.as_ref().to_path_buf(),
            }
        }

        fn temp_path(&self) -> PathBuf {
            let mut tmp = self.path.clone();
            tmp.set_extension("json.tmp");
            tmp
        }
    }

    impl StorageBackend for FileStorage {
        fn name(&self) -> &str {
            "FileStorage"
        }

        fn load_all(&self) -> StorageResult<HashMap<String, FlagEntry>> {
            if !self.path.exists() {
                return Ok(HashMap::new());
            }

            let file = File::open(&self.path)?;
            let reader = BufReader::new(file);

            let flag_file: RawFlagFile = serde_json::from_reader(reader).map_err(|e| {
                StorageError::Serialization(format!("failed to parse flag file: {e}"))
            })?;

            if flag_file.format_version != FlagFile::FORMAT_VERSION {
                tracing::warn!(
                    stored = flag_file.format_version,
                    expected = FlagFile::FORMAT_VERSION,
                    "flag file format version mismatch, ignoring stored flags"
                );
                return Ok(HashMap::new());
            }

            let mut entries = HashMap::with_capacity(flag_file.flags.len());
            for (key, raw) in flag_file.flags {
                match serde_json::from_value::<FileEntry>(raw) {
                    Ok(entry) => {
                        entries.insert(
                            key.clone(),
                            FlagEntry {
                                key,
                                value: entry.value,
                                updated_at_ms: entry.updated_at_ms,
                            },
                        );
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %self.path.display(),
                            key = %key,
                            error = %e,
                            "skipping corrupt flag entry"
                        );
                    }
                }
            }
            Ok(entries)
        }

        fn save_all(&self, entries: &HashMap<String, FlagEntry>) -> StorageResult<()> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }

            let mut flag_file = FlagFile::new();
            for (key, entry) in entries {
                flag_file.flags.insert(
                    key.clone(),
                    FileEntry {
                        value: entry.value,
                        updated_at_ms: entry.updated_at_ms,
                    },
                );
            }

            let tmp_path = self.temp_path();
            {
                let file = File::create(&tmp_path)?;
                let mut writer = BufWriter::new(file);
                serde_json::to_writer_pretty(&mut writer, &flag_file).map_err(|e| {
                    StorageError::Serialization(format!("failed to serialize flags: {e}"))
                })?;
                writer.flush()?;
                writer.get_ref().sync_all()?;
            }

            fs::rename(&tmp_path, &self.path)?;

            tracing::debug!(
                path = %self.path.display(),
                entries = entries.len(),
                "saved walkthrough flags"
            );

            Ok(())
        }

        fn clear(&self) -> StorageResult<()> {
            if self.path.exists() {
                fs::remove_file(&self.path)?;
            }
            Ok(())
        }
    }

    impl fmt::Debug for FileStorage {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("FileStorage")
                .field("path", &self.path)
                .finish()
        }
    }
}

#[cfg(feature = "state-persistence")]
pub use file_storage::FileStorage;

// ─────────────────────────────────────────────────────────────────────────────
// Flag Registry
// ─────────────────────────────────────────────────────────────────────────────

/// Cached view over a [`StorageBackend`].
///
/// Reads come from the cache; writes mark the registry dirty until
/// [`flush`](Self::flush) persists them.
///
/// # Example
///
/// ```ignore
/// use guidepost_runtime::flag_store::FlagRegistry;
///
/// let flags = FlagRegistry::in_memory();
/// flags.set("tour-completed", true);
/// flags.flush()?;
/// assert!(flags.get("tour-completed"));
/// ```
pub struct FlagRegistry {
    backend: Box<dyn StorageBackend>,
    cache: RwLock<HashMap<String, FlagEntry>>,
    dirty: RwLock<bool>,
}

impl FlagRegistry {
    /// Create a new registry with the given storage backend.
    ///
    /// Does not automatically load from storage; call [`load`](Self::load) first.
    #[must_use]
    pub fn new(backend: Box<dyn StorageBackend>) -> Self {
        Self {
            backend,
            cache: RwLock::new(HashMap::new()),
            dirty: RwLock::new(false),
        }
    }

    /// Create a registry with memory storage (ephemeral, for testing).
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStorage::new()))
    }

    /// Create a registry with file storage at the given path.
    #[cfg(feature = "state-persistence")]
    #[must_use]
    pub fn with_file(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(Box::new(FileStorage::new(path)))
    }

    /// Load all flags from the storage backend, replacing the cache.
    pub fn load(&self) -> StorageResult<usize> {
        let entries = self.backend.load_all()?;
        let count = entries.len();

        let mut cache = self
            .cache
            .write()
            .map_err(|_| StorageError::Corruption("cache lock poisoned".into()))?;
        *cache = entries;

        let mut dirty = self
            .dirty
            .write()
            .map_err(|_| StorageError::Corruption("dirty lock poisoned".into()))?;
        *dirty = false;

        tracing::debug!(backend = %self.backend.name(), count, "loaded walkthrough flags");
        Ok(count)
    }

    /// Flush dirty flags to the storage backend.
    ///
    /// Returns `Ok(true)` if data was written, `Ok(false)` if no changes.
    pub fn flush(&self) -> StorageResult<bool> {
        let dirty = {
            let guard = self
                .dirty
                .read()
                .map_err(|_| StorageError::Corruption("dirty lock poisoned".into()))?;
            *guard
        };

        if !dirty {
            return Ok(false);
        }

        let cache = self
            .cache
            .read()
            .map_err(|_| StorageError::Corruption("cache lock poisoned".into()))?;

        self.backend.save_all(&cache)?;

        let mut dirty_guard = self
            .dirty
            .write()
            .map_err(|_| StorageError::Corruption("dirty lock poisoned".into()))?;
        *dirty_guard = false;

        Ok(true)
    }

    /// Read a flag. Missing keys read as `false`.
    #[must_use]
    pub fn get(&self, key: &str) -> bool {
        self.entry(key).is_some_and(|e| e.value)
    }

    /// Full entry for a key, including its write timestamp.
    #[must_use]
    pub fn entry(&self, key: &str) -> Option<FlagEntry> {
        let cache = self.cache.read().ok()?;
        cache.get(key).cloned()
    }

    /// Set a flag, stamped with the current wall-clock time.
    ///
    /// Marks the registry as dirty; call [`flush`](Self::flush) to persist.
    pub fn set(&self, key: impl Into<String>, value: bool) {
        self.set_at(key, value, now_unix_ms());
    }

    /// Set a flag with an explicit timestamp.
    pub fn set_at(&self, key: impl Into<String>, value: bool, updated_at_ms: u64) {
        let key = key.into();
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(
                key.clone(),
                FlagEntry {
                    key,
                    value,
                    updated_at_ms,
                },
            );
            if let Ok(mut dirty) = self.dirty.write() {
                *dirty = true;
            }
        }
    }

    /// Clear all flags from both cache and storage.
    pub fn clear(&self) -> StorageResult<()> {
        self.backend.clear()?;
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
        if let Ok(mut dirty) = self.dirty.write() {
            *dirty = false;
        }
        Ok(())
    }

    /// Get the number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }

    /// Check if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if there are unsaved changes.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty.read().map(|d| *d).unwrap_or(false)
    }

    /// Wrap in Arc for shared ownership.
    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl fmt::Debug for FlagRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagRegistry")
            .field("backend", &self.backend.name())
            .field("entries", &self.len())
            .field("dirty", &self.is_dirty())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, value: bool) -> FlagEntry {
        FlagEntry {
            key: key.to_string(),
            value,
            updated_at_ms: 7,
        }
    }

    #[test]
    fn memory_storage_basic_operations() {
        let storage = MemoryStorage::new();
        assert!(storage.load_all().unwrap().is_empty());

        let mut data = HashMap::new();
        data.insert("tour-completed".to_string(), entry("tour-completed", true));
        storage.save_all(&data).unwrap();

        let loaded = storage.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded["tour-completed"].value);

        storage.clear().unwrap();
        assert!(storage.load_all().unwrap().is_empty());
    }

    #[test]
    fn memory_storage_clones_share_data() {
        let a = MemoryStorage::new();
        let b = a.clone();
        let mut data = HashMap::new();
        data.insert("k".to_string(), entry("k", true));
        a.save_all(&data).unwrap();
        assert_eq!(b.load_all().unwrap().len(), 1);
    }

    #[test]
    fn missing_flag_reads_false() {
        let registry = FlagRegistry::in_memory();
        assert!(!registry.get("welcome-shown"));
        assert!(registry.entry("welcome-shown").is_none());
    }

    #[test]
    fn registry_basic_operations() {
        let registry = FlagRegistry::in_memory();
        assert!(registry.is_empty());
        assert!(!registry.is_dirty());

        registry.set_at("tour-completed", true, 42);
        assert!(registry.get("tour-completed"));
        assert_eq!(registry.entry("tour-completed").unwrap().updated_at_ms, 42);
        assert!(registry.is_dirty());

        assert!(registry.flush().unwrap());
        assert!(!registry.is_dirty());
        assert!(!registry.flush().unwrap());

        registry.set("tour-completed", false);
        assert!(!registry.get("tour-completed"));
        assert_eq!(registry.len(), 1);
        assert!(registry.is_dirty());
    }

    #[test]
    fn registry_survives_restart_over_shared_storage() {
        let storage = MemoryStorage::new();
        {
            let registry = FlagRegistry::new(Box::new(storage.clone()));
            registry.set("tour-skipped", true);
            registry.flush().unwrap();
        }
        let registry = FlagRegistry::new(Box::new(storage));
        assert_eq!(registry.load().unwrap(), 1);
        assert!(registry.get("tour-skipped"));
        assert!(!registry.is_dirty());
    }

    #[test]
    fn registry_clear() {
        let registry = FlagRegistry::in_memory();
        registry.set("a", true);
        registry.set("b", false);
        assert_eq!(registry.len(), 2);

        registry.clear().unwrap();
        assert!(registry.is_empty());
        assert!(!registry.is_dirty());
    }

    #[test]
    fn registry_shared() {
        let registry = FlagRegistry::in_memory().shared();
        registry.set("x", true);
        let registry2 = Arc::clone(&registry);
        assert!(registry2.get("x"));
    }

    #[test]
    fn storage_error_display() {
        let io_err = StorageError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        assert!(io_err.to_string().contains("I/O error"));

        let corrupt = StorageError::Corruption("bad data".into());
        assert!(corrupt.to_string().contains("corruption"));

        let unavail = StorageError::Unavailable("no backend".into());
        assert!(unavail.to_string().contains("unavailable"));
    }

    #[test]
    fn now_is_after_2020() {
        assert!(now_unix_ms() > 1_577_836_800_000);
    }
}

#[cfg(all(test, feature = "state-persistence"))]
mod file_storage_tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_storage_persists_flags() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("flags.json");
        let storage = FileStorage::new(&path);

        let mut entries = HashMap::new();
        entries.insert(
            "tour-completed".to_string(),
            FlagEntry {
                key: "tour-completed".to_string(),
                value: true,
                updated_at_ms: 1234,
            },
        );
        storage.save_all(&entries).unwrap();
        assert!(path.exists());

        let loaded = storage.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded["tour-completed"].value);
        assert_eq!(loaded["tour-completed"].updated_at_ms, 1234);
    }

    #[test]
    fn file_storage_load_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let storage = FileStorage::new(tmp.path().join("does_not_exist.json"));
        assert!(storage.load_all().unwrap().is_empty());
    }

    #[test]
    fn file_storage_rejects_garbage() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("flags.json");
        std::fs::write(&path, "not json").unwrap();
        let storage = FileStorage::new(&path);
        assert!(matches!(
            storage.load_all(),
            Err(StorageError::Serialization(_))
        ));
    }

    #[test]
    fn file_storage_skips_corrupt_entry_and_keeps_the_rest() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("flags.json");
        std::fs::write(
            &path,
            r#"{"format_version":1,"flags":{
                "tour-completed":{"value":true,"updated_at_ms":5},
                "welcome-shown":{"value":"yes"},
                "tour-skipped":42
            }}"#,
        )
        .unwrap();
        let loaded = FileStorage::new(&path).load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded["tour-completed"].value);
        assert_eq!(loaded["tour-completed"].updated_at_ms, 5);
    }

    #[test]
    fn corrupt_entry_does_not_erase_good_flags_on_next_flush() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("flags.json");
        std::fs::write(
            &path,
            r#"{"format_version":1,"flags":{
                "tour-completed":{"value":true},
                "welcome-shown":{"value":"yes"}
            }}"#,
        )
        .unwrap();

        let registry = FlagRegistry::with_file(&path);
        assert_eq!(registry.load().unwrap(), 1);
        assert!(registry.get("tour-completed"));
        registry.set("onboarding-completed", true);
        registry.flush().unwrap();

        let reloaded = FlagRegistry::with_file(&path);
        assert_eq!(reloaded.load().unwrap(), 2);
        assert!(reloaded.get("tour-completed"));
        assert!(reloaded.get("onboarding-completed"));
        assert!(!reloaded.get("welcome-shown"));
    }

    #[test]
    fn file_storage_ignores_future_format() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("flags.json");
        std::fs::write(
            &path,
            r#"{"format_version":99,"flags":{"tour-completed":{"value":true}}}"#,
        )
        .unwrap();
        let storage = FileStorage::new(&path);
        assert!(storage.load_all().unwrap().is_empty());
    }

    #[test]
    fn file_storage_missing_timestamp_defaults_to_zero() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("flags.json");
        std::fs::write(
            &path,
            r#"{"format_version":1,"flags":{"welcome-shown":{"value":true}}}"#,
        )
        .unwrap();
        let loaded = FileStorage::new(&path).load_all().unwrap();
        assert_eq!(loaded["welcome-shown"].updated_at_ms, 0);
    }

    #[test]
    fn file_storage_clear_and_parent_dirs() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("dirs").join("flags.json");
        let registry = FlagRegistry::with_file(&path);
        registry.set("welcome-shown", true);
        registry.flush().unwrap();
        assert!(path.exists());

        registry.clear().unwrap();
        assert!(!path.exists());
    }
}
