//! Engine state persistence
//!
//! Config, proposal records and ledger state each live in their own JSON file
//! inside the data directory. Writes go to a temporary file first and are
//! renamed into place, keeping rotated backups of the previous version. A lock
//! file serialises whole load-modify-save cycles across processes.

use crate::config::EngineConfig;
use crate::ledger::LedgerState;
use crate::multisig::TransactionRecord;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Format version of the proposals file
const PROPOSALS_VERSION: u32 = 1;

/// Poll interval while waiting for the lock file
const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Data directory is locked by another process (remove {0:?} if it is stale)")]
    Locked(PathBuf),
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub config_file: String,
    pub proposals_file: String,
    pub ledger_file: String,
    pub backup_enabled: bool,
    pub max_backups: usize,
    /// How long to wait for another process to release the lock
    pub lock_timeout: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".multisig_data"),
            config_file: "config.json".to_string(),
            proposals_file: "proposals.json".to_string(),
            ledger_file: "ledger.json".to_string(),
            backup_enabled: true,
            max_backups: 5,
            lock_timeout: Duration::from_secs(10),
        }
    }
}

/// On-disk layout of the proposals file
#[derive(Debug, Serialize, Deserialize)]
struct ProposalsFile {
    version: u32,
    records: Vec<TransactionRecord>,
}

/// Exclusive hold on the data directory, released on drop
#[derive(Debug)]
pub struct StorageLock {
    path: PathBuf,
}

impl Drop for StorageLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            log::warn!("Failed to release lock {:?}: {}", self.path, e);
        }
    }
}

/// Engine storage manager
#[derive(Debug)]
pub struct Storage {
    config: StorageConfig,
}

impl Storage {
    /// Create a new storage manager
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.data_dir)?;
        Ok(Self { config })
    }

    /// Create with default configuration
    pub fn with_defaults() -> Result<Self, StorageError> {
        Self::new(StorageConfig::default())
    }

    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.config.data_dir.join(file)
    }

    /// Get a backup file path
    fn backup_path(&self, file: &str, index: usize) -> PathBuf {
        self.config
            .data_dir
            .join(format!("{}.backup.{}", file, index))
    }

    /// Check if the engine has been initialised in this directory
    pub fn is_initialized(&self) -> bool {
        self.path(&self.config.config_file).exists()
    }

    // =========================================================================
    // Typed files
    // =========================================================================

    pub fn save_config(&self, config: &EngineConfig) -> Result<(), StorageError> {
        self.save_json(&self.config.config_file, config)
    }

    pub fn load_config(&self) -> Result<EngineConfig, StorageError> {
        if !self.is_initialized() {
            return Err(StorageError::InvalidData(format!(
                "no engine configured in {:?}, run init first",
                self.config.data_dir
            )));
        }
        self.load_json(&self.config.config_file)
    }

    pub fn save_proposals(&self, records: &[TransactionRecord]) -> Result<(), StorageError> {
        let file = ProposalsFile {
            version: PROPOSALS_VERSION,
            records: records.to_vec(),
        };
        self.save_json(&self.config.proposals_file, &file)
    }

    /// Load proposal records; an absent file means none were submitted yet
    pub fn load_proposals(&self) -> Result<Vec<TransactionRecord>, StorageError> {
        if !self.path(&self.config.proposals_file).exists() {
            return Ok(Vec::new());
        }

        let file: ProposalsFile = self.load_json(&self.config.proposals_file)?;
        if file.version != PROPOSALS_VERSION {
            return Err(StorageError::InvalidData(format!(
                "unsupported proposals file version {}",
                file.version
            )));
        }
        Ok(file.records)
    }

    pub fn save_ledger(&self, state: &LedgerState) -> Result<(), StorageError> {
        self.save_json(&self.config.ledger_file, state)
    }

    /// Load ledger state, `None` if it was never saved
    pub fn load_ledger(&self) -> Result<Option<LedgerState>, StorageError> {
        if !self.path(&self.config.ledger_file).exists() {
            return Ok(None);
        }
        self.load_json(&self.config.ledger_file).map(Some)
    }

    // =========================================================================
    // Generic JSON files
    // =========================================================================

    /// Atomically replace `file` with the JSON form of `value`
    pub fn save_json<T: Serialize>(&self, file: &str, value: &T) -> Result<(), StorageError> {
        let path = self.path(file);

        // Create backup if enabled
        if self.config.backup_enabled && self.config.max_backups > 0 && path.exists() {
            self.rotate_backups(file)?;
            fs::copy(&path, self.backup_path(file, 0))?;
        }

        // Write to temporary file first
        let temp_path = self.path(&format!("{}.tmp", file));
        let mut writer = BufWriter::new(fs::File::create(&temp_path)?);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
        drop(writer);

        // Atomic rename
        fs::rename(&temp_path, &path)?;

        Ok(())
    }

    pub fn load_json<T: DeserializeOwned>(&self, file: &str) -> Result<T, StorageError> {
        let reader = BufReader::new(fs::File::open(self.path(file))?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Rotate backup files
    fn rotate_backups(&self, file: &str) -> Result<(), StorageError> {
        // Delete oldest backup
        let oldest = self.backup_path(file, self.config.max_backups - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        // Shift existing backups
        for i in (0..self.config.max_backups - 1).rev() {
            let current = self.backup_path(file, i);
            if current.exists() {
                fs::rename(&current, self.backup_path(file, i + 1))?;
            }
        }

        Ok(())
    }

    /// List available backups of `file`, newest first
    pub fn list_backups(&self, file: &str) -> Vec<usize> {
        (0..self.config.max_backups)
            .filter(|&i| self.backup_path(file, i).exists())
            .collect()
    }

    // =========================================================================
    // Cross-process lock
    // =========================================================================

    /// Take the data directory lock, waiting up to the configured timeout
    pub async fn lock(&self) -> Result<StorageLock, StorageError> {
        let path = self.path(".lock");
        let started = Instant::now();

        loop {
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
            {
                Ok(mut file) => {
                    // The pid is informational; the file's existence is the lock
                    if let Err(e) = writeln!(file, "{}", std::process::id()) {
                        log::warn!("Failed to record pid in lock {:?}: {}", path, e);
                    }
                    return Ok(StorageLock { path });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    if started.elapsed() >= self.config.lock_timeout {
                        return Err(StorageError::Locked(path));
                    }
                    tokio::time::sleep(LOCK_RETRY_INTERVAL).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
