//! Data models
//!
//! Rust structs representing database entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default identity provider for new users
pub const DEFAULT_PROVIDER: &str = "github";

/// A user who has logged in through an OAuth provider
///
/// `id` is the provider's numeric user id, stringified. Rows are
/// written once, on first login, and never updated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub login: String,
    pub provider: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub created: DateTime<Utc>,
}

/// Profile fields needed to create a user on first login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub id: String,
    pub login: String,
    pub provider: String,
    pub name: Option<String>,
    pub email: Option<String>,
}
