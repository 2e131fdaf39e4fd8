//! Warden server: authentication and session service.
//!
//! Main entry point that wires all crates together and starts the server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing_subscriber::{EnvFilter, fmt};

use warden_api::AppState;
use warden_auth::lockout::{CacheLockoutStore, LockoutStore, MemoryLockoutStore};
use warden_auth::{AccountLockout, LockoutPolicy, RateLimiter, SessionCleanup};
use warden_cache::CacheManager;
use warden_core::config::{AppConfig, DatabaseBackend, LockoutBackend};
use warden_core::error::AppError;
use warden_database::DatabasePool;
use warden_database::memory::{
    MemoryPermissionRepository, MemoryRefreshTokenRepository, MemoryRoleRepository,
    MemoryUserRepository,
};
use warden_database::migration::run_migrations;
use warden_database::repositories::{
    PgPermissionRepository, PgRefreshTokenRepository, PgRoleRepository, PgUserRepository,
};
use warden_entity::role::{Permission, Role, SYSTEM_ADMIN};
use warden_service::auth::Repositories;
use warden_service::{AuthDeps, AuthService, BroadcastEventBus, EventLogger};

/// How often expired refresh tokens are purged.
const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "warden-server", version, about = "Warden authentication service")]
struct Args {
    /// Configuration environment; selects `config/{env}.toml`.
    #[arg(long, env = "WARDEN_ENV", default_value = "development")]
    env: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match load_configuration(&args.env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load and validate configuration for the environment.
fn load_configuration(env: &str) -> Result<AppConfig, AppError> {
    let config = AppConfig::load(env)?;
    config.validate(env)?;
    Ok(config)
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function.
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Warden v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Cache ────────────────────────────────────────────
    let cache = CacheManager::new(&config.cache).await?;
    tracing::info!(provider = ?config.cache.provider, "Cache initialized");

    // ── Step 2: Repositories ─────────────────────────────────────
    let (repos, db_pool) = build_repositories(&config).await?;

    // ── Step 3: Auth system ──────────────────────────────────────
    let lockout_store: Arc<dyn LockoutStore> = match config.lockout.backend {
        LockoutBackend::Memory => Arc::new(MemoryLockoutStore::new(
            config.lockout.max_tracked_identifiers,
        )),
        LockoutBackend::Cache => Arc::new(CacheLockoutStore::new(cache.clone())),
    };
    let lockout = AccountLockout::new(lockout_store, LockoutPolicy::from(&config.lockout));

    let event_bus = Arc::new(BroadcastEventBus::new(config.events.channel_capacity));
    let refresh_repo = Arc::clone(&repos.refresh_tokens);
    let deps = AuthDeps::new(
        &config.auth,
        repos,
        cache.clone(),
        lockout,
        event_bus.clone(),
    )?;
    let auth = AuthService::new(Arc::new(deps));
    let rate_limiter = Arc::new(RateLimiter::from_config(&config.rate_limit));

    // ── Step 4: Background tasks ─────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut tasks: Vec<JoinHandle<()>> = Vec::new();

    tasks.push(tokio::spawn(
        EventLogger::new(&event_bus).run(shutdown_rx.clone()),
    ));
    tasks.push(tokio::spawn(
        SessionCleanup::new(refresh_repo).run(SESSION_CLEANUP_INTERVAL, shutdown_rx.clone()),
    ));
    if config.rate_limit.enabled {
        tasks.push(tokio::spawn(Arc::clone(&rate_limiter).run_cleanup(
            Duration::from_secs(config.rate_limit.cleanup_interval_seconds),
            shutdown_rx.clone(),
        )));
    }

    // ── Step 5: HTTP server ──────────────────────────────────────
    let state = AppState::new(auth, rate_limiter, config.rate_limit.enabled, cache);
    let app = warden_api::build_router(state, &config.server);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    tracing::info!(address = %addr, "Warden listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
    })
    .await
    .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 6: Wait for background tasks ────────────────────────
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    for task in tasks {
        if tokio::time::timeout(grace, task).await.is_err() {
            tracing::warn!("Background task did not stop within the grace period");
        }
    }

    if let Some(pool) = db_pool {
        pool.close().await;
    }
    tracing::info!("Warden stopped");
    Ok(())
}

/// Build the repositories for the configured backend.
async fn build_repositories(
    config: &AppConfig,
) -> Result<(Repositories, Option<DatabasePool>), AppError> {
    match config.database.backend {
        DatabaseBackend::Postgres => {
            let db = DatabasePool::connect(&config.database).await?;
            run_migrations(db.pool()).await?;
            tracing::info!("Database migrations complete");

            let pool = db.pool().clone();
            let repos = Repositories {
                users: Arc::new(PgUserRepository::new(pool.clone())),
                roles: Arc::new(PgRoleRepository::new(pool.clone())),
                permissions: Arc::new(PgPermissionRepository::new(pool.clone())),
                refresh_tokens: Arc::new(PgRefreshTokenRepository::new(pool)),
            };
            Ok((repos, Some(db)))
        }
        DatabaseBackend::Memory => {
            tracing::warn!("Using in-memory repositories; data is lost on restart");

            let permissions = Arc::new(MemoryPermissionRepository::new());
            let admin = Permission::new(SYSTEM_ADMIN);
            let admin_id = admin.id;
            permissions.insert(admin).await;

            let roles = Arc::new(MemoryRoleRepository::new());
            roles.insert(Role::new("user", true, Vec::new())).await;
            roles.insert(Role::new("admin", false, vec![admin_id])).await;

            let repos = Repositories {
                users: Arc::new(MemoryUserRepository::new()),
                roles,
                permissions,
                refresh_tokens: Arc::new(MemoryRefreshTokenRepository::new()),
            };
            Ok((repos, None))
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
