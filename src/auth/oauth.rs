//! OAuth login flow
//!
//! Implements the OAuth 2.0 authorization code flow and logout.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::Deserialize;

use super::client::{OAuthClient, Provider};
use super::session::SESSION_COOKIE;
use super::state::{STATE_COOKIE, create_state_cookie, generate_state, verify_state};
use crate::AppState;
use crate::data::NewUser;
use crate::error::AppError;
use crate::response::{Found, FoundUrl};

/// Create authentication router
///
/// Routes:
/// - GET /{provider}/login - Redirect to the provider
/// - GET /{provider}/callback - OAuth callback
/// - GET /logout - Logout
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/:provider/login", get(login))
        .route("/:provider/callback", get(callback))
        .route("/logout", get(logout))
}

fn state_cookie(value: String) -> Cookie<'static> {
    Cookie::build((STATE_COOKIE, value))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build()
}

fn session_cookie(session_id: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .secure(true)
        .build()
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build(name).path("/").build()
}

// =============================================================================
// Login
// =============================================================================

/// GET /{provider}/login
///
/// # Steps
/// 1. Look up the registered app (500 if missing)
/// 2. Generate CSRF state and store it signed in a cookie
/// 3. Redirect to the provider with client_id, redirect_uri, scope, state
async fn login(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    jar: CookieJar,
) -> Result<(CookieJar, FoundUrl), AppError> {
    let provider: Provider = provider.parse()?;
    let client = state.oauth.client(provider)?;

    let csrf_state = generate_state();
    let cookie_value = create_state_cookie(&csrf_state, &state.config.auth.session_key)?;
    let authorize_url = client.authorize_url(&csrf_state)?;

    tracing::debug!(%provider, redirect_uri = client.redirect_uri(), "Starting OAuth login");

    Ok((jar.add(state_cookie(cookie_value)), FoundUrl(authorize_url)))
}

// =============================================================================
// Callback
// =============================================================================

/// Query parameters from the provider callback
#[derive(Debug, Deserialize)]
struct CallbackQuery {
    /// Authorization code
    code: Option<String>,
    /// CSRF state token
    state: Option<String>,
    /// Set instead of `code` when the user declined or the app is misconfigured
    error: Option<String>,
    error_description: Option<String>,
}

/// GET /{provider}/callback
///
/// # Steps
/// 1. Fail on a provider-reported error
/// 2. Verify CSRF state
/// 3. Exchange code for access token and fetch user info
/// 4. Create the user on first login
/// 5. Create session and set cookie
/// 6. Redirect to /app
///
/// The state cookie is single-use and is cleared whether or not the
/// login succeeds.
async fn callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> Result<(CookieJar, Found), (CookieJar, AppError)> {
    let provider: Provider = provider.parse().map_err(|e| (jar.clone(), e))?;
    let client = state.oauth.client(provider).map_err(|e| (jar.clone(), e))?;

    let result = complete_login(&state, provider, client, &query, &jar).await;
    crate::metrics::record_login(
        provider.as_str(),
        if result.is_ok() { "success" } else { "failure" },
    );

    let jar = jar.remove(removal_cookie(STATE_COOKIE));
    match result {
        Ok(session_id) => {
            record_active_sessions(&state).await;
            Ok((jar.add(session_cookie(session_id)), Found("/app")))
        }
        Err(error) => Err((jar, error)),
    }
}

async fn complete_login(
    state: &AppState,
    provider: Provider,
    client: &OAuthClient,
    query: &CallbackQuery,
    jar: &CookieJar,
) -> Result<String, AppError> {
    if let Some(error) = &query.error {
        let description = query.error_description.as_deref().unwrap_or_default();
        tracing::warn!(%provider, %error, description, "Provider returned an error");
        return Err(AppError::Upstream(format!("{error}: {description}")));
    }

    let cookie = jar.get(STATE_COOKIE).ok_or(AppError::InvalidState)?;
    let returned_state = query.state.as_deref().ok_or(AppError::InvalidState)?;
    verify_state(cookie.value(), returned_state, &state.config.auth.session_key)?;

    let code = query
        .code
        .as_deref()
        .filter(|code| !code.is_empty())
        .ok_or_else(|| AppError::Upstream("callback without authorization code".to_string()))?;

    let profile = client.callback(code).await?;

    let user = state
        .db
        .upsert_on_first_login(&NewUser {
            id: profile.id,
            login: profile.login,
            provider: provider.as_str().to_string(),
            name: profile.name,
            email: profile.email,
        })
        .await?;

    let session_id = state.sessions.create(&user.id).await?;

    tracing::info!(user_id = %user.id, login = %user.login, %provider, "User logged in");

    Ok(session_id)
}

// =============================================================================
// Logout
// =============================================================================

/// GET /logout
///
/// Ends the session, if any, clears the cookie and redirects home.
async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Found), AppError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.destroy(cookie.value()).await?;
        record_active_sessions(&state).await;
        tracing::info!("Session ended");
    }

    Ok((jar.remove(removal_cookie(SESSION_COOKIE)), Found("/")))
}

/// Refresh the live-session gauge from the store
async fn record_active_sessions(state: &AppState) {
    match state.sessions.count().await {
        Ok(count) => crate::metrics::SESSIONS_ACTIVE.set(count as i64),
        Err(error) => tracing::warn!(%error, "Failed to count sessions"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_is_httponly_and_secure() {
        let cookie = session_cookie("abc".to_string());

        assert_eq!(cookie.name(), "session_id");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert!(cookie.max_age().is_none());
        assert!(cookie.expires().is_none());
    }

    #[test]
    fn state_cookie_is_lax() {
        let cookie = state_cookie("s.sig".to_string());

        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.http_only(), Some(true));
    }
}
