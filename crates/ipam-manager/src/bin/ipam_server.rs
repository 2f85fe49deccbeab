use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ipam_manager::store::{InMemoryPoolStore, JsonFilePoolStore, PoolStore};
use ipam_manager::{start_server, ApiServerConfig, AppState, PoolManager, PoolManagerConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StoreKind {
    /// Volatile, lost on exit
    Memory,
    /// JSON file at --data-file
    File,
}

#[derive(Parser)]
#[command(name = "ipam-server")]
#[command(about = "IPv4 pool management API server")]
#[command(version)]
struct Cli {
    /// Server bind address (default: $IPAM_API_HOST or 0.0.0.0)
    #[arg(long)]
    host: Option<String>,

    /// Server port (default: $IPAM_API_PORT or 8080)
    #[arg(long)]
    port: Option<u16>,

    /// Pool storage backend
    #[arg(long, value_enum, default_value = "memory")]
    store: StoreKind,

    /// Data file for the file store
    #[arg(long, env = "IPAM_DATA_FILE", default_value = "ipam-pools.json")]
    data_file: PathBuf,

    /// Blocks per page when a block listing gives no limit
    #[arg(long, default_value = "256")]
    default_block_limit: usize,

    /// Largest block page a client may request
    #[arg(long, default_value = "4096")]
    max_block_limit: usize,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.debug {
        "ipam_manager=debug,tower_http=debug"
    } else {
        "ipam_manager=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store: Arc<dyn PoolStore> = match cli.store {
        StoreKind::Memory => Arc::new(InMemoryPoolStore::new()),
        StoreKind::File => Arc::new(
            JsonFilePoolStore::open(&cli.data_file).with_context(|| {
                format!("failed to open pool store {}", cli.data_file.display())
            })?,
        ),
    };

    let manager = PoolManager::with_config(
        store,
        PoolManagerConfig {
            default_block_limit: cli.default_block_limit,
            max_block_limit: cli.max_block_limit,
        },
    );
    let mut config = ApiServerConfig::from_env();
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    tracing::info!(store = ?cli.store, "Starting IPAM server");
    tracing::info!("Health endpoint: http://{}/health", config.bind_addr());

    start_server(Arc::new(AppState::with_manager(manager)), config).await?;

    Ok(())
}
