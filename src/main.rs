//! Multisig CLI Application
//!
//! Submit, confirm and execute mint/burn proposals against the token ledger.

use clap::{Parser, Subcommand};
use multisig_engine::api::{create_router, ApiState};
use multisig_engine::cli::{self, AppState, CliResult, InitOptions};
use multisig_engine::multisig::MultisigError;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "multisig")]
#[command(version)]
#[command(about = "Multi-owner authorization engine for token mints and burns", long_about = None)]
struct Cli {
    /// Data directory for engine state
    #[arg(short, long, default_value = ".multisig_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure owners, quorum and token ledger
    Init {
        /// Owner identity (repeat for each owner)
        #[arg(short, long = "owner")]
        owners: Vec<String>,

        /// Confirmations required before execution
        #[arg(short, long)]
        quorum: Option<usize>,

        /// Treasury account holding the initial supply
        #[arg(long)]
        treasury: Option<String>,

        /// Initial supply credited to the treasury
        #[arg(long)]
        initial_supply: Option<String>,

        /// Upper bound on a single ledger call, in milliseconds
        #[arg(long)]
        ledger_timeout_ms: Option<u64>,

        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },

    /// Propose minting tokens to an account
    SubmitMint {
        /// Recipient account (0x + 40 hex digits)
        account: String,

        /// Amount in the smallest unit
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },

    /// Propose burning tokens from the treasury
    SubmitBurn {
        /// Amount in the smallest unit
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },

    /// Confirm a proposal as one of the owners
    Confirm {
        /// Proposal id
        id: u64,

        /// Owner identity
        owner: String,
    },

    /// Apply a confirmed proposal to the ledger
    Execute {
        /// Proposal id
        id: u64,
    },

    /// List unexecuted proposals
    ListPending,

    /// List all proposals
    List,

    /// Show one proposal
    Get {
        /// Proposal id
        id: u64,
    },

    /// Show an account's token balance
    Balance {
        /// Account address
        address: String,
    },

    /// Show token details
    TokenInfo,

    /// REST API server
    Api {
        #[command(subcommand)]
        action: ApiCommands,
    },
}

#[derive(Subcommand)]
enum ApiCommands {
    /// Start the REST API server
    Start {
        /// Port to listen on for REST API
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

fn main() -> ExitCode {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("❌ Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {}", e);
            match e.downcast_ref::<MultisigError>() {
                Some(err) => ExitCode::from(err.exit_code()),
                None => ExitCode::FAILURE,
            }
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Init {
            owners,
            quorum,
            treasury,
            initial_supply,
            ledger_timeout_ms,
            force,
        } => cli::cmd_init(
            &cli.data_dir,
            InitOptions {
                owners,
                quorum,
                treasury,
                initial_supply,
                ledger_timeout_ms,
                force,
            },
        )
        .await,

        Commands::Api {
            action: ApiCommands::Start { port },
        } => run_api_server(&cli.data_dir, port).await,

        command => {
            let state = AppState::open(cli.data_dir.clone()).await?;
            match command {
                Commands::SubmitMint { account, amount } => {
                    cli::cmd_submit_mint(&state, &account, &amount).await
                }
                Commands::SubmitBurn { amount } => cli::cmd_submit_burn(&state, &amount).await,
                Commands::Confirm { id, owner } => cli::cmd_confirm(&state, id, &owner).await,
                Commands::Execute { id } => cli::cmd_execute(&state, id).await,
                Commands::ListPending => cli::cmd_list_pending(&state).await,
                Commands::List => cli::cmd_list(&state).await,
                Commands::Get { id } => cli::cmd_get(&state, id).await,
                Commands::Balance { address } => cli::cmd_balance(&state, &address).await,
                Commands::TokenInfo => cli::cmd_token_info(&state).await,
                Commands::Init { .. } | Commands::Api { .. } => unreachable!(),
            }
        }
    }
}

async fn run_api_server(data_dir: &Path, port: u16) -> CliResult<()> {
    let storage = cli::open_storage(data_dir)?;
    // Held for the server's lifetime so CLI commands cannot race it
    let lock = storage.lock().await?;
    let (engine, ledger) = cli::load_engine(&storage)?;

    println!(
        "📂 Loaded engine: {} owners, {} proposals",
        engine.owners().description(),
        engine.list_transactions().await.len()
    );

    let state = ApiState::new(Arc::new(engine), ledger, Arc::new(storage));
    let shutdown_state = state.clone();
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    println!("🚀 REST API server starting on http://localhost:{}", port);
    println!();
    println!("📖 Available endpoints:");
    println!("   GET  /health                           - Health check");
    println!("   GET  /ws                               - WebSocket events");
    println!("   GET  /api/transactions                 - List proposals");
    println!("   GET  /api/transactions/pending         - Pending proposals");
    println!("   GET  /api/transactions/{{id}}            - Get proposal");
    println!("   POST /api/transactions/mint            - Propose mint");
    println!("   POST /api/transactions/burn            - Propose burn");
    println!("   POST /api/transactions/{{id}}/confirm    - Confirm proposal");
    println!("   POST /api/transactions/{{id}}/execute    - Execute proposal");
    println!("   GET  /api/token                        - Token info");
    println!("   GET  /api/balance/{{address}}            - Account balance");
    println!("   GET  /api/owners                       - Owner set");
    println!();

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            println!("\n📴 Shutting down API server...");
        })
        .await?;

    println!("💾 Saving data...");
    shutdown_state.persist().await?;
    drop(lock);
    println!("✅ Data saved successfully!");

    Ok(())
}
