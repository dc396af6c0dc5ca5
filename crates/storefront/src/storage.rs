//! Persistent cart slot.
//!
//! The cart survives restarts by being written, as a JSON array of
//! `{id, name, price, image, quantity}` records, to a single named slot.
//!
//! # Backends
//!
//! - [`FileStorage`] - one `<slot>.json` file inside a data directory
//! - [`MemoryStorage`] - an in-process slot, for tests and embedders
//!
//! Loading never fails: a missing slot or unreadable content yields an empty
//! cart, and corruption is only logged.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use lumina_core::Cart;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Default slot name for the cart.
pub const DEFAULT_CART_SLOT: &str = "lumina_cart";

/// Errors that can occur when writing the cart slot.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Cart could not be serialized.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// In-memory slot lock was poisoned by a panicking writer.
    #[error("storage slot lock poisoned")]
    Poisoned,
}

/// A durable slot holding one serialized cart.
pub trait CartStorage {
    /// Read the cart, or an empty one if the slot is missing or malformed.
    fn load(&self) -> Cart;

    /// Overwrite the slot with `cart`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cart could not be written.
    fn save(&self, cart: &Cart) -> Result<(), StorageError>;
}

/// Parse slot content, treating anything invalid as an empty cart.
fn decode(slot: &str, raw: &str) -> Cart {
    match serde_json::from_str::<Cart>(raw) {
        Ok(cart) => cart,
        Err(e) => {
            tracing::warn!(slot, error = %e, "Discarding malformed cart slot");
            Cart::new()
        }
    }
}

// =============================================================================
// File Storage
// =============================================================================

/// Cart slot stored as `<dir>/<slot>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    slot: String,
    path: PathBuf,
}

impl FileStorage {
    /// Create a file-backed slot inside `dir`.
    ///
    /// The directory is created on first save if it does not exist.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>, slot: impl Into<String>) -> Self {
        let slot = slot.into();
        let path = dir.as_ref().join(format!("{slot}.json"));
        Self { slot, path }
    }

    /// Path of the slot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl CartStorage for FileStorage {
    fn load(&self) -> Cart {
        match fs::read_to_string(&self.path) {
            Ok(raw) => decode(&self.slot, &raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Cart::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read cart slot");
                Cart::new()
            }
        }
    }

    fn save(&self, cart: &Cart) -> Result<(), StorageError> {
        let json = serde_json::to_vec(cart)?;

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;

        // Write a sibling temp file and rename it over the slot so readers
        // never see a partial write. The temp file is removed on drop if any
        // step fails.
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.io_error(e))?;
        tmp.write_all(&json).map_err(|e| self.io_error(e))?;
        tmp.as_file().sync_all().map_err(|e| self.io_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_error(e.error))?;

        tracing::debug!(path = %self.path.display(), items = cart.len(), "Cart saved");
        Ok(())
    }
}

// =============================================================================
// Memory Storage
// =============================================================================

/// In-process cart slot.
///
/// Clones share the same slot, so a test can keep a handle and inspect what
/// the store wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a slot pre-filled with raw content.
    #[must_use]
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(raw.into()))),
        }
    }

    /// Current raw slot content, if any.
    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self) -> Cart {
        self.raw()
            .map_or_else(Cart::new, |raw| decode(DEFAULT_CART_SLOT, &raw))
    }

    fn save(&self, cart: &Cart) -> Result<(), StorageError> {
        let json = serde_json::to_string(cart)?;
        let mut slot = self.slot.lock().map_err(|_| StorageError::Poisoned)?;
        *slot = Some(json);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_cart() -> Cart {
        let mut cart = Cart::new();
        cart.add("r1", "Ring", 5000, "r1.png");
        cart.add("e1", "Earring", 2000, "e1.png");
        cart.add("r1", "Ring", 5000, "r1.png");
        cart
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path(), DEFAULT_CART_SLOT);
        let cart = sample_cart();

        storage.save(&cart).unwrap();
        let loaded = storage.load();

        assert_eq!(loaded, cart);
        assert_eq!(loaded.items()[0].quantity, 2);
        assert_eq!(loaded.items()[1].id.as_str(), "e1");
    }

    #[test]
    fn test_file_missing_slot_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path(), "absent");
        assert!(storage.load().is_empty());
    }

    #[test]
    fn test_file_corrupt_slot_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path(), DEFAULT_CART_SLOT);
        fs::write(storage.path(), "{not json").unwrap();
        assert!(storage.load().is_empty());
    }

    #[test]
    fn test_file_save_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested/data"), DEFAULT_CART_SLOT);
        storage.save(&sample_cart()).unwrap();
        assert!(storage.path().exists());
    }

    #[test]
    fn test_file_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path(), DEFAULT_CART_SLOT);
        storage.save(&sample_cart()).unwrap();
        storage.save(&Cart::new()).unwrap();

        assert!(storage.load().is_empty());
        assert_eq!(fs::read_to_string(storage.path()).unwrap(), "[]");
    }

    #[test]
    fn test_file_save_leaves_only_slot() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path(), DEFAULT_CART_SLOT);
        storage.save(&sample_cart()).unwrap();
        storage.save(&sample_cart()).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("lumina_cart.json")]);
    }

    #[test]
    fn test_file_failed_save_cleans_up_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path(), DEFAULT_CART_SLOT);
        // A non-empty directory in the slot's place makes the final rename fail
        fs::create_dir(storage.path()).unwrap();
        fs::write(storage.path().join("keep"), "x").unwrap();

        let err = storage.save(&sample_cart()).unwrap_err();

        assert!(matches!(err, StorageError::Io { .. }));
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("lumina_cart.json")]);
    }

    #[test]
    fn test_memory_round_trip() {
        let storage = MemoryStorage::new();
        let cart = sample_cart();
        storage.save(&cart).unwrap();
        assert_eq!(storage.load(), cart);
    }

    #[test]
    fn test_memory_invariant_violation_is_empty() {
        let storage = MemoryStorage::with_raw(
            r#"[{"id":"r1","name":"Ring","price":5000,"image":"r1.png","quantity":0}]"#,
        );
        assert!(storage.load().is_empty());
    }

    #[test]
    fn test_memory_wrong_shape_is_empty() {
        let storage = MemoryStorage::with_raw(r#"{"items": []}"#);
        assert!(storage.load().is_empty());
    }
}
