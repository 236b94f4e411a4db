//! Storage module for engine persistence

pub mod persistence;

pub use persistence::{Storage, StorageConfig, StorageError, StorageLock};
