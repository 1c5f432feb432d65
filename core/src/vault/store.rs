//! # Secret Stores
//!
//! Where vault records end up. The identity and wallet managers only ever
//! see the [`SecretStore`] trait, so the same code runs against an
//! in-process map in tests and a sled database on disk in the CLI.
//!
//! Values are opaque strings: either `ENCRYPTED:<vault blob>` or the legacy
//! hex encoding. Stores never look inside them.

use std::collections::HashMap;
use std::path::Path;

use parking_lot::RwLock;
use sled::{Batch, Db, Tree};

use crate::error::{CoreError, Result};

/// Name of the sled tree holding all slots.
const SECRETS_TREE: &str = "secrets";

/// String key/value persistence for vault records.
///
/// Implementations must be safe to share between threads. Writes to the same
/// slot are last-writer-wins; callers that need create/restore exclusivity
/// serialize those calls themselves.
///
/// [`put_all`](SecretStore::put_all) and
/// [`remove_all`](SecretStore::remove_all) apply every entry or none, so
/// slots that describe one record never disagree.
pub trait SecretStore: Send + Sync {
    fn get(&self, slot: &str) -> Result<Option<String>>;

    fn put(&self, slot: &str, value: &str) -> Result<()>;

    /// Remove a slot. Removing a missing slot is not an error.
    fn remove(&self, slot: &str) -> Result<()>;

    /// Write several slots in one atomic step.
    fn put_all(&self, entries: &[(&str, &str)]) -> Result<()>;

    /// Remove several slots in one atomic step. Missing slots are skipped.
    fn remove_all(&self, slots: &[&str]) -> Result<()>;

    fn contains(&self, slot: &str) -> Result<bool> {
        Ok(self.get(slot)?.is_some())
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// Process-local store. Everything is gone when it drops.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecretStore for MemoryStore {
    fn get(&self, slot: &str) -> Result<Option<String>> {
        Ok(self.slots.read().get(slot).cloned())
    }

    fn put(&self, slot: &str, value: &str) -> Result<()> {
        self.slots.write().insert(slot.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, slot: &str) -> Result<()> {
        self.slots.write().remove(slot);
        Ok(())
    }

    fn put_all(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut slots = self.slots.write();
        for (slot, value) in entries {
            slots.insert(slot.to_string(), value.to_string());
        }
        Ok(())
    }

    fn remove_all(&self, slots: &[&str]) -> Result<()> {
        let mut map = self.slots.write();
        for slot in slots {
            map.remove(*slot);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SledStore
// ---------------------------------------------------------------------------

/// On-disk store backed by a sled tree.
///
/// sled handles its own locking, so `SledStore` is `Clone` and can be shared
/// freely. Every write is flushed before returning.
#[derive(Debug, Clone)]
pub struct SledStore {
    db: Db,
    secrets: Tree,
}

impl SledStore {
    /// Open or create a store in `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_db(sled::open(path)?)
    }

    /// A throwaway store that sled deletes on drop.
    pub fn open_temporary() -> Result<Self> {
        Self::from_db(sled::Config::new().temporary(true).open()?)
    }

    fn from_db(db: Db) -> Result<Self> {
        let secrets = db.open_tree(SECRETS_TREE)?;
        Ok(Self { db, secrets })
    }

    /// `true` if `open` found an existing database on disk.
    pub fn was_recovered(&self) -> bool {
        self.db.was_recovered()
    }
}

impl SecretStore for SledStore {
    fn get(&self, slot: &str) -> Result<Option<String>> {
        match self.secrets.get(slot.as_bytes())? {
            Some(bytes) => String::from_utf8(bytes.to_vec())
                .map(Some)
                .map_err(|e| CoreError::Storage(format!("slot {slot}: {e}"))),
            None => Ok(None),
        }
    }

    fn put(&self, slot: &str, value: &str) -> Result<()> {
        self.secrets.insert(slot.as_bytes(), value.as_bytes())?;
        self.secrets.flush()?;
        Ok(())
    }

    fn remove(&self, slot: &str) -> Result<()> {
        self.secrets.remove(slot.as_bytes())?;
        self.secrets.flush()?;
        Ok(())
    }

    fn put_all(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut batch = Batch::default();
        for (slot, value) in entries {
            batch.insert(slot.as_bytes(), value.as_bytes());
        }
        self.secrets.apply_batch(batch)?;
        self.secrets.flush()?;
        Ok(())
    }

    fn remove_all(&self, slots: &[&str]) -> Result<()> {
        let mut batch = Batch::default();
        for slot in slots {
            batch.remove(slot.as_bytes());
        }
        self.secrets.apply_batch(batch)?;
        self.secrets.flush()?;
        Ok(())
    }
}
