//! Configuration
//! Mission: Resolve flags and environment into one immutable service config

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use tracing::warn;

/// Signing secret used only when running with `--app-env development`.
const DEV_JWT_SECRET: &str = "dev-secret-change-me-development-only";

#[derive(Parser, Debug)]
#[command(name = "car-listing-api")]
#[command(about = "REST API for the car listing catalog")]
pub struct Cli {
    /// Path to the SQLite database
    #[arg(long, env = "DATABASE_PATH", default_value = "cars.db", global = true)]
    pub database_path: String,

    /// Maximum pooled database connections
    #[arg(long, env = "DB_POOL_SIZE", default_value_t = 10, global = true)]
    pub db_pool_size: u32,

    /// bcrypt work factor for newly hashed passwords
    #[arg(long, env = "BCRYPT_COST", default_value_t = bcrypt::DEFAULT_COST, global = true)]
    pub bcrypt_cost: u32,

    #[command(flatten)]
    pub serve: ServeArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Add a user with a bcrypt-hashed password
    CreateUser {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "NEW_USER_PASSWORD")]
        password: String,

        #[arg(short, long)]
        email: Option<String>,

        #[arg(short, long, default_value = "customer")]
        role: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:3000", global = true)]
    pub bind_addr: SocketAddr,

    /// Token signing secret (required outside development)
    #[arg(long, env = "JWT_SECRET", hide_env_values = true, global = true)]
    pub jwt_secret: Option<String>,

    /// Deployment environment
    #[arg(
        long,
        env = "APP_ENV",
        value_enum,
        default_value_t = AppEnv::Production,
        global = true
    )]
    pub app_env: AppEnv,

    /// Comma-separated list of allowed CORS origins
    #[arg(
        long,
        env = "CORS_ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:3000",
        global = true
    )]
    pub cors_origins: Vec<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

/// Resolved server configuration, built once at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub db_pool_size: u32,
    pub bcrypt_cost: u32,
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub app_env: AppEnv,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let serve = &cli.serve;
        let jwt_secret = match (serve.jwt_secret.as_deref().map(str::trim), serve.app_env) {
            (Some(secret), _) if !secret.is_empty() => secret.to_string(),
            (_, AppEnv::Development) => {
                warn!("⚠️  JWT_SECRET not set, using the development signing secret");
                DEV_JWT_SECRET.to_string()
            }
            (_, AppEnv::Production) => {
                bail!("JWT_SECRET must be set when APP_ENV is production")
            }
        };

        if jwt_secret.len() < 32 {
            warn!("JWT_SECRET is shorter than 32 bytes");
        }

        let cors_origins = serve
            .cors_origins
            .iter()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        Ok(Self {
            database_path: cli.database_path.clone(),
            db_pool_size: cli.db_pool_size,
            bcrypt_cost: cli.bcrypt_cost,
            bind_addr: serve.bind_addr,
            jwt_secret,
            app_env: serve.app_env,
            cors_origins,
        })
    }
}
