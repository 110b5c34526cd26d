//! User Storage
//! Mission: Read user accounts and check bcrypt credentials against them

use crate::auth::models::{User, UserRole};
use crate::db::Database;
use anyhow::{Context, Result};
use bcrypt::{hash, verify};
use rusqlite::{params, OptionalExtension, Row};
use std::sync::Arc;
use tracing::{info, warn};

const USER_COLUMNS: &str = "userId, username, password, email, role";

/// User storage backed by the pooled database
pub struct UserStore {
    db: Database,
    bcrypt_cost: u32,
    // Compared against when the username is unknown so both failure paths
    // spend the same bcrypt work.
    dummy_hash: Arc<str>,
}

impl UserStore {
    pub fn new(db: Database, bcrypt_cost: u32) -> Result<Self> {
        let dummy_hash = hash("not-a-real-password", bcrypt_cost)
            .context("Failed to derive placeholder password hash")?;

        Ok(Self {
            db,
            bcrypt_cost,
            dummy_hash: Arc::from(dummy_hash),
        })
    }

    fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
        let role: String = row.get(4)?;
        Ok(User {
            user_id: row.get(0)?,
            username: row.get(1)?,
            password_hash: row.get(2)?,
            email: row.get(3)?,
            role: UserRole::from(role),
        })
    }

    /// Get user by username (exact match)
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let username = username.to_string();
        self.db
            .run(move |conn| {
                let user = conn
                    .query_row(
                        &format!("SELECT {} FROM users WHERE username = ?1", USER_COLUMNS),
                        params![username],
                        Self::user_from_row,
                    )
                    .optional()
                    .context("Failed to look up user")?;
                Ok(user)
            })
            .await
    }

    /// Verify username and password.
    ///
    /// Returns `Ok(None)` for an unknown user and for a wrong password alike.
    /// `Err` is reserved for data-access faults.
    pub async fn verify_credentials(&self, username: &str, password: &str) -> Result<Option<User>> {
        let user = self.get_user_by_username(username).await?;

        let stored_hash: Arc<str> = match &user {
            Some(user) => Arc::from(user.password_hash.as_str()),
            None => self.dummy_hash.clone(),
        };
        let password = password.to_string();

        let matched = tokio::task::spawn_blocking(move || verify(password, &stored_hash))
            .await
            .context("Password verification task aborted")?;

        match (user, matched) {
            (Some(user), Ok(true)) => Ok(Some(user)),
            (Some(user), Err(e)) => {
                warn!(
                    "Stored credential for {} is not a valid bcrypt hash: {}",
                    user.username, e
                );
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    /// Create a new user with a freshly hashed password
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
        role: UserRole,
    ) -> Result<User> {
        let cost = self.bcrypt_cost;
        let plain = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hash(plain, cost))
            .await
            .context("Password hashing task aborted")?
            .context("Failed to hash password")?;

        let mut user = User {
            user_id: 0,
            username: username.to_string(),
            password_hash,
            email: email.map(str::to_string),
            role,
        };

        let row = user.clone();
        user.user_id = self
            .db
            .run(move |conn| {
                conn.execute(
                    "INSERT INTO users (username, password, email, role) VALUES (?1, ?2, ?3, ?4)",
                    params![row.username, row.password_hash, row.email, row.role.as_str()],
                )
                .context("Failed to insert user")?;
                Ok(conn.last_insert_rowid())
            })
            .await?;

        info!("✅ Created user: {} ({})", user.username, user.role);

        Ok(user)
    }
}
