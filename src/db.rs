//! Database Pool
//! Mission: Hand out short-lived SQLite connections without blocking the async workers

use anyhow::{Context, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::time::Duration;
use tracing::{debug, info};

/// Tables this service reads and writes. Idempotent.
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    userId INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT UNIQUE NOT NULL,
    password TEXT NOT NULL,
    email TEXT,
    role TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS cars (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    car_name TEXT,
    car_description TEXT,
    brand TEXT,
    price REAL,
    year INTEGER,
    stocks INTEGER,
    car_image TEXT
);
"#;

/// Pooled handle to the relational store. Cheap to clone.
#[derive(Clone)]
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    /// Open the pool and make sure the schema exists.
    pub fn open(db_path: &str, max_connections: u32) -> Result<Self> {
        let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
            conn.busy_timeout(Duration::from_secs(5))?;
            conn.execute_batch("PRAGMA foreign_keys = ON;")
        });

        let pool = Pool::builder()
            .max_size(max_connections.max(1))
            .min_idle(Some(1))
            .connection_timeout(Duration::from_secs(5))
            .build(manager)
            .with_context(|| format!("Failed to open database pool at {}", db_path))?;

        let db = Self { pool };
        db.init_schema()?;

        info!(
            "📊 Database ready at {} (pool size {})",
            db_path,
            max_connections.max(1)
        );

        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self
            .pool
            .get()
            .context("Failed to check out database connection")?;
        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize database schema")?;
        Ok(())
    }

    /// Run `op` against a pooled connection on the blocking thread pool.
    ///
    /// The connection goes back to the pool when `op` returns, whether it
    /// succeeded, failed, or panicked.
    pub async fn run<F, T>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool
                .get()
                .context("Failed to check out database connection")?;
            debug!(idle = pool.state().idle_connections, "db connection checked out");
            op(&conn)
        })
        .await
        .context("Database task aborted")?
    }
}
