//! Durable keyed storage for ledger scopes.
//!
//! Maps a network key to the ordered list of transactions tracked on it.

use dashmap::DashMap;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

use crate::config::StorageConfig;
use crate::tracking::types::TransactionInfo;

/// Storage failures.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Persistent map from network key to transactions.
pub trait TransactionStorage: Send + Sync {
    /// Stored transactions for `network`, empty if none.
    fn load(&self, network: &str) -> StorageResult<Vec<TransactionInfo>>;

    /// Replace the stored transactions for `network`.
    fn store(&self, network: &str, transactions: &[TransactionInfo]) -> StorageResult<()>;
}

/// Process-local storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    inner: DashMap<String, Vec<TransactionInfo>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TransactionStorage for MemoryStorage {
    fn load(&self, network: &str) -> StorageResult<Vec<TransactionInfo>> {
        Ok(self
            .inner
            .get(network)
            .map(|r| r.value().clone())
            .unwrap_or_default())
    }

    fn store(&self, network: &str, transactions: &[TransactionInfo]) -> StorageResult<()> {
        self.inner.insert(network.to_string(), transactions.to_vec());
        Ok(())
    }
}

type Scopes = BTreeMap<String, Vec<TransactionInfo>>;

/// Single JSON file holding every network scope: `{ "<network>": [...] }`.
///
/// Writes go to a sibling temp file first and are renamed into place.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    scopes: Mutex<Scopes>,
}

impl JsonFileStorage {
    /// Open the file, loading existing scopes if it exists.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        let scopes: Scopes = if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            serde_json::from_reader(reader)?
        } else {
            Scopes::new()
        };

        tracing::info!(
            path = %path.display(),
            networks = scopes.len(),
            transactions = scopes.values().map(Vec::len).sum::<usize>(),
            "Loaded transaction storage"
        );

        Ok(Self {
            path,
            scopes: Mutex::new(scopes),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_file(&self, scopes: &Scopes) -> StorageResult<()> {
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer(&mut writer, scopes)?;
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl TransactionStorage for JsonFileStorage {
    fn load(&self, network: &str) -> StorageResult<Vec<TransactionInfo>> {
        let scopes = self.scopes.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(scopes.get(network).cloned().unwrap_or_default())
    }

    fn store(&self, network: &str, transactions: &[TransactionInfo]) -> StorageResult<()> {
        let mut scopes = self.scopes.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = scopes.insert(network.to_string(), transactions.to_vec());

        if let Err(e) = self.write_file(&scopes) {
            // Keep memory and disk in agreement.
            match previous {
                Some(previous) => scopes.insert(network.to_string(), previous),
                None => scopes.remove(network),
            };
            tracing::error!(path = %self.path.display(), network, error = %e, "Failed to persist transactions");
            return Err(e);
        }

        tracing::debug!(network, transactions = transactions.len(), "Persisted transactions");
        Ok(())
    }
}

/// Storage selected by configuration: JSON file when a path is set, memory otherwise.
pub fn open_storage(config: &StorageConfig) -> StorageResult<Arc<dyn TransactionStorage>> {
    match &config.path {
        Some(path) => Ok(Arc::new(JsonFileStorage::open(path)?)),
        None => Ok(Arc::new(MemoryStorage::new())),
    }
}
