use chrono::Utc;
use clap::Parser;

use community_connect::{
    auth::JwtConfig,
    logging::setup_logging,
    servers::{ApiConfig, ApiServer, AppState},
    store::SqliteStore,
};

#[derive(Parser, Debug)]
#[command(name = "community_connect")]
struct Config {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port for the HTTP API
    #[arg(short = 'p', long, default_value_t = 8082)]
    port: u16,

    /// Path to the SQLite database
    #[arg(long, default_value = "data/connect.db")]
    db_path: String,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Write rotating log files to this directory instead of stderr
    #[arg(long)]
    log_dir: Option<String>,
}

/// Bootstrap administrator, taken from ADMIN_EMAIL / ADMIN_PASSWORD
struct AdminSeed {
    email: String,
    password: String,
}

impl AdminSeed {
    fn from_env() -> Option<Self> {
        let email = std::env::var("ADMIN_EMAIL").ok()?;
        let password = std::env::var("ADMIN_PASSWORD").ok()?;
        Some(Self { email, password })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    let _logger = setup_logging(&config.log_level, config.log_dir.as_deref())?;

    // Ensure data directory exists
    if let Some(parent) = std::path::Path::new(&config.db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    let store = SqliteStore::new(&config.db_path)?;
    log::info!("🔐 Store opened (db: {})", config.db_path);

    let state = AppState::new(store, JwtConfig::from_env())?;

    match AdminSeed::from_env() {
        Some(seed) => {
            if let Some(admin) = state.auth.ensure_admin(&seed.email, &seed.password, Utc::now())? {
                log::info!("✅ Administrator {} created", admin.id);
            }
        }
        None => log::info!("ℹ️ ADMIN_EMAIL/ADMIN_PASSWORD not set, skipping admin bootstrap"),
    }

    let api_config = ApiConfig {
        port: config.port,
        host: config.host,
    };

    ApiServer::new(api_config, state).start().await
}
