//! Cryptographic helpers
//!
//! Signing and key custody belong to the ledger; this module only hashes.

pub mod hash;

pub use hash::{hash_fields, sha256, sha256_hex};
