//! CloudVault Server: personal cloud storage backend.
//!
//! Main entry point that wires all crates together and starts the server.

use tracing_subscriber::{EnvFilter, fmt};

use cloudvault_api::AppState;
use cloudvault_core::config::AppConfig;
use cloudvault_core::error::AppError;
use cloudvault_database::Database;
use cloudvault_entity::user::CreateUser;
use cloudvault_storage::StorageManager;

#[tokio::main]
async fn main() {
    let env = std::env::var("CLOUDVAULT_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging. `RUST_LOG` wins over the configured level.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    if config.logging.is_json() {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .pretty()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting CloudVault v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Persistence backend (+ migrations) ───────────────
    tracing::info!(provider = %config.database.provider, "Connecting to database...");
    let database = Database::connect(&config.database).await?;

    // ── Step 2: Object storage ───────────────────────────────────
    tracing::info!(
        provider = %config.storage.provider,
        upload_dir = %config.storage.upload_dir,
        "Initializing storage..."
    );
    let storage = StorageManager::from_config(&config.storage).await?;

    // ── Step 3: Services and HTTP state ──────────────────────────
    let bootstrap = config.auth.bootstrap_user.clone();
    let default_quota = config.storage.default_quota_bytes;
    let state = AppState::new(config, database.clone(), storage);

    // ── Step 4: Bootstrap account ────────────────────────────────
    if let Some(user) = bootstrap {
        let created = state
            .user_service
            .ensure_user(CreateUser {
                username: user.username,
                email: user.email,
                full_name: None,
                storage_quota: user.storage_quota_bytes.unwrap_or(default_quota),
            })
            .await?;
        tracing::info!(user_id = created.id, username = %created.username, "Bootstrap user ready");
    }

    // ── Step 5: Serve until shutdown ─────────────────────────────
    let result = cloudvault_api::serve(state).await;
    database.close().await;
    result
}
