//! barcheck daemon: serves the verification API and exposes the admin
//! workflow on the command line.

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use barcheck_nullables::NullStore;
use barcheck_rpc::{AppState, DynStore, RpcServer};
use barcheck_store::RegistryStore;
use barcheck_store_lmdb::LmdbEnvironment;
use barcheck_types::{RequestId, SystemClock};
use barcheck_utils::{init_logging, LogFormat, ShutdownController};
use barcheck_verification::{DuplicatePolicy, VerificationService};
use clap::Parser;
use serde::Serialize;

use crate::config::{ServiceConfig, StoreKind};

/// Registry seeded by `--seed-demo` on an empty store.
const DEMO_LAWYERS: [(&str, &str, &str); 3] = [
    ("12345-1234567-1", "LTR-12345", "Advocate Ayesha Siddiqi"),
    ("98765-7654321-9", "LTR-54321", "Barrister Khalid Mehmood"),
    ("11111-1111111-1", "LTR-11111", "Advocate Sarah Khan"),
];

#[derive(Parser)]
#[command(name = "barcheck-daemon", about = "Lawyer credential verification service")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings are
    /// used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Data directory for the LMDB environment.
    #[arg(long, env = "BARCHECK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Storage backend.
    #[arg(long, value_enum, env = "BARCHECK_STORE")]
    store: Option<StoreKind>,

    #[arg(long, env = "BARCHECK_BIND_ADDRESS")]
    bind_address: Option<String>,

    /// HTTP port.
    #[arg(long, env = "BARCHECK_RPC_PORT")]
    rpc_port: Option<u16>,

    /// Reviewer name recorded on admin decisions.
    #[arg(long, env = "BARCHECK_REVIEWER")]
    reviewer: Option<String>,

    /// "accumulate" or "reuse".
    #[arg(long, env = "BARCHECK_DUPLICATE_POLICY", value_parser = parse_policy)]
    duplicate_policy: Option<DuplicatePolicy>,

    /// Insert the demo lawyers when the registry is empty.
    #[arg(long, env = "BARCHECK_SEED_DEMO")]
    seed_demo: bool,

    /// "human" or "json".
    #[arg(long, env = "BARCHECK_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "BARCHECK_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the HTTP server.
    Serve,
    /// Run the LMDB integrity check and exit.
    CheckDb,
    #[command(flatten)]
    Admin(AdminCommand),
}

/// One-shot admin operations against the configured store.
#[derive(clap::Subcommand)]
enum AdminCommand {
    /// Insert a lawyer directly into the registry.
    AddLawyer {
        national_id: String,
        letter_id: String,
        full_name: String,
    },
    /// Print pending verification requests.
    ListPending,
    /// Approve a pending request under the given name.
    Approve { id: u64, full_name: String },
    /// Reject a pending request.
    Reject { id: u64 },
    /// Print the registry.
    ListLawyers,
}

fn parse_policy(s: &str) -> Result<DuplicatePolicy, String> {
    match s.to_ascii_lowercase().as_str() {
        "accumulate" => Ok(DuplicatePolicy::Accumulate),
        "reuse" => Ok(DuplicatePolicy::Reuse),
        other => Err(format!("unknown duplicate policy '{other}'")),
    }
}

impl Cli {
    /// File (or default) settings with CLI flags and env vars on top.
    fn resolve_config(&self) -> anyhow::Result<ServiceConfig> {
        let base = match &self.config {
            Some(path) => ServiceConfig::from_toml_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ServiceConfig::default(),
        };
        Ok(ServiceConfig {
            data_dir: self.data_dir.clone().unwrap_or(base.data_dir),
            store: self.store.unwrap_or(base.store),
            bind_address: self.bind_address.clone().unwrap_or(base.bind_address),
            rpc_port: self.rpc_port.unwrap_or(base.rpc_port),
            reviewer: self.reviewer.clone().unwrap_or(base.reviewer),
            duplicate_policy: self.duplicate_policy.unwrap_or(base.duplicate_policy),
            seed_demo_registry: self.seed_demo || base.seed_demo_registry,
            log_format: self.log_format.unwrap_or(base.log_format),
            log_level: self.log_level.clone().unwrap_or(base.log_level),
            lmdb_map_size: base.lmdb_map_size,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    init_logging(config.log_format, &config.log_level)?;

    match cli.command {
        Command::CheckDb => check_db(&config),
        Command::Serve => {
            let service = build_service(&config)?;
            serve(config, service).await
        }
        Command::Admin(command) => {
            let service = build_service(&config)?;
            run_admin(command, &service, &config.reviewer)
        }
    }
}

fn build_service(config: &ServiceConfig) -> anyhow::Result<VerificationService<DynStore>> {
    let store = open_store(config)?;
    let service = VerificationService::new(store, Arc::new(SystemClock), config.duplicate_policy);
    if config.seed_demo_registry {
        seed_demo_registry(&service)?;
    }
    Ok(service)
}

fn run_admin(
    command: AdminCommand,
    service: &VerificationService<DynStore>,
    reviewer: &str,
) -> anyhow::Result<()> {
    let review = service.review();
    match command {
        AdminCommand::AddLawyer {
            national_id,
            letter_id,
            full_name,
        } => print_json(&review.add_lawyer(&national_id, &letter_id, &full_name)?),
        AdminCommand::ListPending => print_json(&review.list_pending()?),
        AdminCommand::Approve { id, full_name } => {
            print_json(&review.approve(RequestId::new(id), &full_name, reviewer)?)
        }
        AdminCommand::Reject { id } => print_json(&review.reject(RequestId::new(id), reviewer)?),
        AdminCommand::ListLawyers => print_json(&review.list_lawyers()?),
    }
}

async fn serve(config: ServiceConfig, service: VerificationService<DynStore>) -> anyhow::Result<()> {
    tracing::info!(
        bind = %config.bind_address,
        port = config.rpc_port,
        store = ?config.store,
        policy = ?config.duplicate_policy,
        "starting barcheck daemon"
    );

    let server = RpcServer::new(
        config.bind_address,
        config.rpc_port,
        AppState {
            service,
            reviewer: config.reviewer,
        },
    );

    let shutdown = Arc::new(ShutdownController::new());
    let rx = shutdown.subscribe();
    let signal = shutdown.clone();
    tokio::spawn(async move { signal.wait_for_signal().await });

    server.start(rx).await?;
    tracing::info!("barcheck daemon exited cleanly");
    Ok(())
}

fn open_lmdb(config: &ServiceConfig) -> anyhow::Result<LmdbEnvironment> {
    LmdbEnvironment::open(&config.data_dir, config.lmdb_map_size)
        .with_context(|| format!("opening LMDB at {}", config.data_dir.display()))
}

fn open_store(config: &ServiceConfig) -> anyhow::Result<Arc<DynStore>> {
    match config.store {
        StoreKind::Lmdb => {
            let env = open_lmdb(config)?;
            let report = env.check_integrity()?;
            if !report.is_healthy() {
                for error in &report.errors {
                    tracing::error!(%error, "integrity check failed");
                }
                bail!(
                    "database at {} failed its integrity check ({} problems)",
                    config.data_dir.display(),
                    report.errors.len()
                );
            }
            Ok(Arc::new(env))
        }
        StoreKind::Memory => {
            tracing::warn!("using in-memory store, all data is lost on exit");
            Ok(Arc::new(NullStore::new()))
        }
    }
}

fn check_db(config: &ServiceConfig) -> anyhow::Result<()> {
    if config.store != StoreKind::Lmdb {
        bail!("check-db only applies to the lmdb store");
    }
    let report = open_lmdb(config)?.check_integrity()?;
    println!(
        "checked {} databases, {} entries",
        report.databases_checked, report.total_entries
    );
    for error in &report.errors {
        println!("  {error}");
    }
    if !report.is_healthy() {
        bail!("{} integrity problems found", report.errors.len());
    }
    Ok(())
}

fn seed_demo_registry(service: &VerificationService<DynStore>) -> anyhow::Result<()> {
    if service.store().lawyer_count()? > 0 {
        tracing::debug!("registry not empty, skipping demo seed");
        return Ok(());
    }
    for (national_id, letter_id, full_name) in DEMO_LAWYERS {
        service
            .review()
            .add_lawyer(national_id, letter_id, full_name)?;
    }
    tracing::info!(count = DEMO_LAWYERS.len(), "seeded demo registry");
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
