//! SQLite database operations
//!
//! All database access goes through this module.
//! Queries acquire a pooled connection and hand it back when they finish.

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

use super::models::*;
use crate::error::{AppError, Result};

/// Database connection pool wrapper
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Connect to SQLite database
    ///
    /// Creates the database file if it doesn't exist.
    /// Runs pending migrations automatically.
    ///
    /// # Arguments
    /// * `url` - sqlx connection string, e.g. `sqlite://octogate.db`
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // Every connection to an in-memory database is its own database.
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!("Database connected and migrated successfully");

        Ok(Self { pool })
    }

    // =========================================================================
    // User
    // =========================================================================

    /// Get a user by provider id
    ///
    /// # Returns
    /// The user or None if they never logged in
    pub async fn get_user(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, login, provider, name, email, created FROM user WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Create the user on first login, or return the existing row
    ///
    /// Existing rows are returned unchanged: login, name and email are
    /// not refreshed on later logins.
    pub async fn upsert_on_first_login(&self, new_user: &NewUser) -> Result<User> {
        let result = sqlx::query(
            r#"
            INSERT INTO user (id, login, provider, name, email, created)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(&new_user.id)
        .bind(&new_user.login)
        .bind(&new_user.provider)
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            crate::metrics::USERS_CREATED_TOTAL.inc();
            tracing::info!(
                user_id = %new_user.id,
                login = %new_user.login,
                provider = %new_user.provider,
                "User created"
            );
        }

        self.get_user(&new_user.id).await?.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "user {} missing right after insert",
                new_user.id
            ))
        })
    }

    /// Number of stored users
    pub async fn count_users(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM user")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
