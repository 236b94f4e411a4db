//! CLI commands for the multisig engine
//!
//! Every command runs one load-mutate-save cycle against the data directory
//! while holding its lock.

use crate::config::EngineConfig;
use crate::ledger::{InMemoryLedger, LedgerState};
use crate::multisig::{parse_amount, MultisigEngine, ProposalStore, TransactionRecord};
use crate::storage::{Storage, StorageConfig, StorageLock};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Options for `init`
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Owner identities; the default owner set when empty
    pub owners: Vec<String>,
    pub quorum: Option<usize>,
    pub treasury: Option<String>,
    pub initial_supply: Option<String>,
    pub ledger_timeout_ms: Option<u64>,
    /// Overwrite an existing configuration and discard its state
    pub force: bool,
}

/// Open the storage manager for `data_dir`
pub fn open_storage(data_dir: &Path) -> CliResult<Storage> {
    let storage_config = StorageConfig {
        data_dir: data_dir.to_path_buf(),
        ..Default::default()
    };
    Ok(Storage::new(storage_config)?)
}

/// Rebuild the engine and its ledger from persisted state
pub fn load_engine(storage: &Storage) -> CliResult<(MultisigEngine, Arc<InMemoryLedger>)> {
    let config = storage.load_config()?;
    config.validate()?;

    let ledger = match storage.load_ledger()? {
        Some(state) => InMemoryLedger::from_state(state),
        None => config.new_ledger()?,
    };
    let ledger = Arc::new(ledger);

    let store = ProposalStore::from_records(storage.load_proposals()?)?;
    let engine = MultisigEngine::new(config.owner_set()?, ledger.clone())
        .with_store(store)
        .with_ledger_timeout(config.ledger_timeout());

    log::debug!(
        "Loaded engine from {:?} ({} owners)",
        storage.data_dir(),
        engine.owners().len()
    );

    Ok((engine, ledger))
}

/// Persist proposal records and ledger state
pub async fn save_engine(
    storage: &Storage,
    engine: &MultisigEngine,
    ledger: &InMemoryLedger,
) -> CliResult<()> {
    storage.save_proposals(&engine.snapshot().await)?;
    storage.save_ledger(&ledger.snapshot().await)?;
    Ok(())
}

/// Application state
pub struct AppState {
    pub engine: MultisigEngine,
    pub ledger: Arc<InMemoryLedger>,
    pub storage: Storage,
    pub data_dir: PathBuf,
    _lock: StorageLock,
}

impl AppState {
    /// Lock the data directory and load the engine
    pub async fn open(data_dir: PathBuf) -> CliResult<Self> {
        let storage = open_storage(&data_dir)?;
        let lock = storage.lock().await?;
        let (engine, ledger) = load_engine(&storage)?;

        Ok(Self {
            engine,
            ledger,
            storage,
            data_dir,
            _lock: lock,
        })
    }

    /// Save the current state
    pub async fn save(&self) -> CliResult<()> {
        save_engine(&self.storage, &self.engine, &self.ledger).await
    }
}

fn print_record(record: &TransactionRecord, quorum: usize) {
    println!("   ├─ ID: {}", record.id);
    println!("   ├─ Type: {}", record.tx_type);
    if let Some(account) = &record.account {
        println!("   ├─ Account: {}", account);
    }
    println!("   ├─ Amount: {}", record.amount);
    println!("   ├─ Status: {}", record.status(quorum));
    println!(
        "   ├─ Confirmations: {}/{} [{}]",
        record.confirmation_count(),
        quorum,
        record.confirmed_by().join(", ")
    );
    match &record.receipt {
        Some(receipt) => {
            println!("   ├─ Receipt: {}", receipt.hash);
            println!("   └─ Executed at: {}", receipt.applied_at.to_rfc3339());
        }
        None => println!("   └─ Created at: {}", record.created_at.to_rfc3339()),
    }
}

/// Initialize a new engine configuration
pub async fn cmd_init(data_dir: &Path, options: InitOptions) -> CliResult<()> {
    let storage = open_storage(data_dir)?;
    let _lock = storage.lock().await?;

    if storage.is_initialized() && !options.force {
        println!("⚠️  Engine already configured at {:?}", data_dir);
        println!("   Use --force to reinitialize (this will delete existing proposals)");
        return Ok(());
    }

    let mut config = if options.owners.is_empty() {
        EngineConfig::default()
    } else {
        let owner_count = options.owners.len();
        EngineConfig::new(options.owners, owner_count)
    };
    if let Some(quorum) = options.quorum {
        config.quorum = quorum;
    }
    if let Some(treasury) = options.treasury {
        config.token.treasury = treasury;
    }
    if let Some(supply) = options.initial_supply {
        config.token.initial_supply = parse_amount(&supply)?;
    }
    if let Some(timeout) = options.ledger_timeout_ms {
        config.ledger_timeout_ms = timeout;
    }
    config.validate()?;

    let ledger = LedgerState::new(
        config.token_metadata()?,
        config.treasury()?,
        config.token.initial_supply,
    );
    storage.save_config(&config)?;
    storage.save_proposals(&[])?;
    storage.save_ledger(&ledger)?;

    println!("✅ Multisig engine initialized!");
    println!("   📁 Data directory: {:?}", data_dir);
    println!(
        "   👥 Owners ({}): {}",
        config.owner_set()?.description(),
        config.owners.join(", ")
    );
    println!(
        "   🪙 Token: {} ({}), {} decimals",
        config.token.name, config.token.symbol, config.token.decimals
    );
    println!(
        "   🏦 Treasury: {} holding {}",
        config.treasury()?,
        config.token.initial_supply
    );

    Ok(())
}

/// Propose a mint
pub async fn cmd_submit_mint(state: &AppState, account: &str, amount: &str) -> CliResult<()> {
    let amount = parse_amount(amount)?;
    let id = state.engine.submit_mint(account, amount).await?;
    state.save().await?;

    println!("📝 Mint proposal submitted:");
    print_record(&state.engine.get_transaction(id).await?, state.engine.quorum());
    Ok(())
}

/// Propose a burn from the treasury
pub async fn cmd_submit_burn(state: &AppState, amount: &str) -> CliResult<()> {
    let amount = parse_amount(amount)?;
    let id = state.engine.submit_burn(amount).await?;
    state.save().await?;

    println!("📝 Burn proposal submitted:");
    print_record(&state.engine.get_transaction(id).await?, state.engine.quorum());
    Ok(())
}

/// Confirm a proposal as `owner`
pub async fn cmd_confirm(state: &AppState, id: u64, owner: &str) -> CliResult<()> {
    let outcome = state.engine.confirm_transaction(id, owner).await?;
    state.save().await?;

    if outcome.newly_confirmed {
        println!("✍️  Transaction #{} confirmed by {}", id, owner);
    } else {
        println!("ℹ️  {} had already confirmed transaction #{}", owner, id);
    }
    print_record(&outcome.record, state.engine.quorum());
    if outcome.quorum_reached {
        println!("\n   Quorum reached. Run `multisig execute {}` to apply it.", id);
    }
    Ok(())
}

/// Execute a confirmed proposal against the ledger
pub async fn cmd_execute(state: &AppState, id: u64) -> CliResult<()> {
    let result = state.engine.execute_transaction(id).await;
    // A failed execute can still leave ledger state worth saving
    state.save().await?;

    let execution = result?;
    println!("✅ Transaction #{} executed!", id);
    print_record(&execution.record, state.engine.quorum());
    Ok(())
}

/// List unexecuted proposals
pub async fn cmd_list_pending(state: &AppState) -> CliResult<()> {
    let pending = state.engine.get_pending().await;
    if pending.is_empty() {
        println!("📭 No pending transactions.");
        return Ok(());
    }

    println!("⏳ Pending transactions ({}):", pending.len());
    for record in &pending {
        println!();
        print_record(record, state.engine.quorum());
    }
    Ok(())
}

/// List every proposal
pub async fn cmd_list(state: &AppState) -> CliResult<()> {
    let records = state.engine.list_transactions().await;
    if records.is_empty() {
        println!("📭 No transactions submitted yet.");
        return Ok(());
    }

    println!("📋 Transactions ({}):", records.len());
    for record in &records {
        let target = record
            .account
            .as_ref()
            .map(|a| a.to_string())
            .unwrap_or_else(|| "treasury".to_string());
        println!(
            "   #{} {} {} {} - {} ({}/{})",
            record.id,
            record.tx_type,
            record.amount,
            target,
            record.status(state.engine.quorum()),
            record.confirmation_count(),
            state.engine.quorum()
        );
    }
    Ok(())
}

/// Show one proposal
pub async fn cmd_get(state: &AppState, id: u64) -> CliResult<()> {
    let record = state.engine.get_transaction(id).await?;
    println!("🔎 Transaction #{}", id);
    print_record(&record, state.engine.quorum());
    Ok(())
}

/// Show a ledger balance
pub async fn cmd_balance(state: &AppState, address: &str) -> CliResult<()> {
    let balance = state.engine.query_balance(address).await?;
    println!("💰 Balance for {}", address);
    println!("   Total: {}", balance);
    Ok(())
}

/// Show token details
pub async fn cmd_token_info(state: &AppState) -> CliResult<()> {
    let info = state.engine.token_info().await?;
    println!("🪙 Token Info");
    println!("   ├─ Name: {}", info.name);
    println!("   ├─ Symbol: {}", info.symbol);
    println!("   ├─ Decimals: {}", info.decimals);
    println!("   ├─ Total supply: {}", info.total_supply);
    println!("   ├─ Treasury: {}", state.ledger.treasury().await);
    println!(
        "   └─ Owners: {} ({})",
        state.engine.owners().owners().join(", "),
        state.engine.owners().description()
    );
    Ok(())
}
