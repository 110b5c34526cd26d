//! Car Listing API
//! Mission: Serve the car catalog with token-gated admin operations

use anyhow::{Context, Result};
use car_listing_api::{
    auth::{models::UserRole, UserStore},
    build_router,
    config::{Cli, Command, Config},
    db::Database,
    AppServices,
};
use clap::Parser;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment and logging
    let _ = dotenv();
    init_tracing();

    let cli = Cli::parse();

    match &cli.command {
        Some(Command::CreateUser {
            username,
            password,
            email,
            role,
        }) => create_user(&cli, username, password, email.as_deref(), role).await,
        Some(Command::Serve) | None => serve(&cli).await,
    }
}

async fn serve(cli: &Cli) -> Result<()> {
    let config = Config::resolve(cli)?;

    info!("🚀 Car listing API starting ({:?})", config.app_env);

    let services = AppServices::from_config(&config)?;
    let app = build_router(&services, &config.cors_origins);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("🎯 API server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("👋 Server stopped");
    Ok(())
}

async fn create_user(
    cli: &Cli,
    username: &str,
    password: &str,
    email: Option<&str>,
    role: &str,
) -> Result<()> {
    let db = Database::open(&cli.database_path, 1)?;
    let store = UserStore::new(db, cli.bcrypt_cost)?;

    let user = store
        .create_user(username, password, email, UserRole::from(role))
        .await?;

    println!("Created user {} (userId {}, role {})", user.username, user.user_id, user.role);
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

/// Initialize tracing
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "car_listing_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
