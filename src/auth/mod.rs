//! GitHub OAuth authentication
//!
//! Handles:
//! - OAuth authorization code flow
//! - Server-side session management
//! - Authentication guard

mod client;
mod middleware;
mod oauth;
pub mod session;
pub mod state;

pub use client::{OAuthClient, OAuthProviders, Provider, ProviderUser};
pub use middleware::{CurrentUser, redirect_unauthorized};
pub use oauth::auth_router;
pub use session::{MemorySessionStore, SESSION_COOKIE, SessionStore};
