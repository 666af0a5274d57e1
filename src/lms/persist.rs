// Durable recording of the advancing leaf counter
//
// The scheme is only secure while q_next_usable_key never regresses,
// so the signer hands the advanced counter to a StatePersister before
// any signature bytes are produced. Embedders plug in their own
// storage; the implementations here cover tests (in-memory), simple
// deployments (file) and an explicit opt-out (null).

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::lms::config::I_KEY_ID_LEN;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("persistence io failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("persistence encoding failure: {0}")]
    Encode(String),
}

impl From<bincode::Error> for PersistError {
    fn from(err: bincode::Error) -> Self {
        PersistError::Encode(err.to_string())
    }
}

/// Collaborator that records the advanced counter durably.
///
/// `persist_counter` must not return `Ok` until `q_next` would survive
/// a crash; the signer releases no signature bytes before it does.
pub trait StatePersister {
    fn persist_counter(&mut self, key_id: &[u8; I_KEY_ID_LEN], q_next: u32)
        -> Result<(), PersistError>;
}

/// On-disk record, one per key identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CounterRecord {
    key_id: [u8; I_KEY_ID_LEN],
    q_next: u32,
}

/// Keeps counters in a map. No durability across processes; intended
/// for tests and embedders that layer their own storage on top.
#[derive(Debug, Default)]
pub struct InMemoryPersister {
    counters: HashMap<[u8; I_KEY_ID_LEN], u32>,
}

impl InMemoryPersister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last counter recorded for `key_id`, if any.
    pub fn recorded(&self, key_id: &[u8; I_KEY_ID_LEN]) -> Option<u32> {
        self.counters.get(key_id).copied()
    }
}

impl StatePersister for InMemoryPersister {
    fn persist_counter(
        &mut self,
        key_id: &[u8; I_KEY_ID_LEN],
        q_next: u32,
    ) -> Result<(), PersistError> {
        self.counters.insert(*key_id, q_next);
        Ok(())
    }
}

/// Writes a bincode-encoded [`CounterRecord`] with write-then-rename
/// and an fsync, so a torn write never leaves a regressed counter.
#[derive(Debug)]
pub struct FilePersister {
    path: PathBuf,
}

impl FilePersister {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the recorded counter for `key_id`, `None` if the file does
    /// not exist or records a different key.
    pub fn load(&self, key_id: &[u8; I_KEY_ID_LEN]) -> Result<Option<u32>, PersistError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let record: CounterRecord = bincode::deserialize(&bytes)?;
        Ok((record.key_id == *key_id).then_some(record.q_next))
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StatePersister for FilePersister {
    fn persist_counter(
        &mut self,
        key_id: &[u8; I_KEY_ID_LEN],
        q_next: u32,
    ) -> Result<(), PersistError> {
        let record = CounterRecord {
            key_id: *key_id,
            q_next,
        };
        let bytes = bincode::serialize(&record)?;

        let tmp = self.tmp_path();
        let mut file = fs::File::create(&tmp)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Explicitly discards the counter. Signing still works, but a crash
/// can regress the counter and reuse a one-time key; the first use
/// logs a warning so the risk is never silent.
#[derive(Debug, Default)]
pub struct NullPersister {
    warned: bool,
}

impl NullPersister {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatePersister for NullPersister {
    fn persist_counter(
        &mut self,
        key_id: &[u8; I_KEY_ID_LEN],
        _q_next: u32,
    ) -> Result<(), PersistError> {
        if !self.warned {
            warn!(
                key_id = %hex::encode(key_id),
                "leaf counter not persisted; a crash may reuse a one-time key"
            );
            self.warned = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_ID: [u8; I_KEY_ID_LEN] = [0x3c; I_KEY_ID_LEN];

    #[test]
    fn test_in_memory_persister_records_latest_counter() {
        let mut persister = InMemoryPersister::new();
        assert_eq!(persister.recorded(&KEY_ID), None);

        persister.persist_counter(&KEY_ID, 1).unwrap();
        persister.persist_counter(&KEY_ID, 2).unwrap();
        assert_eq!(persister.recorded(&KEY_ID), Some(2));

        let other = [0x11; I_KEY_ID_LEN];
        persister.persist_counter(&other, 7).unwrap();
        assert_eq!(persister.recorded(&KEY_ID), Some(2));
        assert_eq!(persister.recorded(&other), Some(7));
    }

    #[test]
    fn test_file_persister_round_trips_counter() {
        let path = std::env::temp_dir().join(format!(
            "lms-sig-persist-test-{}-roundtrip.bin",
            std::process::id()
        ));
        let _ = fs::remove_file(&path);

        let mut persister = FilePersister::new(&path);
        assert_eq!(persister.load(&KEY_ID).unwrap(), None);

        persister.persist_counter(&KEY_ID, 41).unwrap();
        persister.persist_counter(&KEY_ID, 42).unwrap();
        assert_eq!(persister.load(&KEY_ID).unwrap(), Some(42));

        // A different key must not read this record
        let other = [0x99; I_KEY_ID_LEN];
        assert_eq!(persister.load(&other).unwrap(), None);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_file_persister_leaves_no_tmp_file() {
        let path = std::env::temp_dir().join(format!(
            "lms-sig-persist-test-{}-tmp.bin",
            std::process::id()
        ));
        let _ = fs::remove_file(&path);

        let mut persister = FilePersister::new(&path);
        persister.persist_counter(&KEY_ID, 3).unwrap();
        assert!(path.exists());
        assert!(!persister.tmp_path().exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_null_persister_accepts_everything() {
        let mut persister = NullPersister::new();
        persister.persist_counter(&KEY_ID, 0).unwrap();
        persister.persist_counter(&KEY_ID, 1023).unwrap();
    }
}
