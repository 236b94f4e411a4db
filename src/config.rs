//! Engine configuration
//!
//! Written to `config.json` in the data directory by `init` and read back by
//! every other command.

use crate::ledger::{Address, AddressError, InMemoryLedger, TokenError, TokenMetadata};
use crate::multisig::{MultisigError, OwnerSet, DEFAULT_LEDGER_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid owner configuration: {0}")]
    Owners(#[from] MultisigError),
    #[error("Invalid treasury: {0}")]
    Treasury(#[from] AddressError),
    #[error("Invalid token configuration: {0}")]
    Token(#[from] TokenError),
    #[error("Ledger timeout must be greater than zero")]
    InvalidTimeout,
}

fn default_ledger_timeout_ms() -> u64 {
    DEFAULT_LEDGER_TIMEOUT.as_millis() as u64
}

/// Parameters of the token ledger the engine executes against
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TokenConfig {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Account holding the initial supply; burns are debited from it
    pub treasury: String,
    #[serde(default)]
    pub initial_supply: u128,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            name: "Carbon Token".to_string(),
            symbol: "CO2".to_string(),
            decimals: 18,
            treasury: "0x0000000000000000000000000000000000000000".to_string(),
            initial_supply: 0,
        }
    }
}

/// Engine configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Owner identities, in order
    pub owners: Vec<String>,
    /// Confirmations required before execution
    pub quorum: usize,
    /// Upper bound on a single ledger call
    #[serde(default = "default_ledger_timeout_ms")]
    pub ledger_timeout_ms: u64,
    #[serde(default)]
    pub token: TokenConfig,
}

impl EngineConfig {
    /// Create a configuration with default ledger settings
    pub fn new(owners: Vec<String>, quorum: usize) -> Self {
        Self {
            owners,
            quorum,
            ledger_timeout_ms: default_ledger_timeout_ms(),
            token: TokenConfig::default(),
        }
    }

    /// Check every field
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.owner_set()?;
        self.treasury()?;
        self.token_metadata()?;
        if self.ledger_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }

    pub fn owner_set(&self) -> Result<OwnerSet, ConfigError> {
        Ok(OwnerSet::new(self.owners.clone(), self.quorum)?)
    }

    pub fn treasury(&self) -> Result<Address, ConfigError> {
        Ok(Address::parse(&self.token.treasury)?)
    }

    pub fn token_metadata(&self) -> Result<TokenMetadata, ConfigError> {
        Ok(TokenMetadata::new(
            self.token.name.clone(),
            self.token.symbol.clone(),
            self.token.decimals,
        )?)
    }

    pub fn ledger_timeout(&self) -> Duration {
        Duration::from_millis(self.ledger_timeout_ms)
    }

    /// Fresh ledger holding the configured initial supply
    pub fn new_ledger(&self) -> Result<InMemoryLedger, ConfigError> {
        Ok(InMemoryLedger::new(
            self.token_metadata()?,
            self.treasury()?,
            self.token.initial_supply,
        ))
    }
}

impl Default for EngineConfig {
    /// Four owners, three confirmations
    fn default() -> Self {
        Self::new(
            (1..=4).map(|i| format!("owner{}", i)).collect(),
            3,
        )
    }
}
