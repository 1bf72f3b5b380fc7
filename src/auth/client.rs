//! OAuth 2.0 client
//!
//! Authorization-code flow against a registered provider app: build the
//! authorize redirect, then trade the returned code for an access token
//! and the user's profile. Tokens are used once and dropped.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::config::AppConfig;
use crate::error::AppError;

/// Supported identity providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    GitHub,
}

impl Provider {
    /// Path segment and stored `provider` value
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::GitHub => "github",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "github" => Ok(Provider::GitHub),
            _ => Err(AppError::NotFound),
        }
    }
}

/// Normalized profile returned by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderUser {
    pub id: String,
    pub login: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Token endpoint response
///
/// GitHub reports a bad or expired code with 200 and an `error` field.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// GitHub user info
#[derive(Debug, Deserialize)]
struct GitHubUser {
    id: u64,
    login: String,
    name: Option<String>,
    email: Option<String>,
}

impl From<GitHubUser> for ProviderUser {
    fn from(user: GitHubUser) -> Self {
        Self {
            id: user.id.to_string(),
            login: user.login,
            name: user.name,
            email: user.email,
        }
    }
}

/// A registered OAuth app
#[derive(Debug, Clone)]
pub struct OAuthClient {
    client_id: String,
    client_secret: String,
    authorize_url: String,
    token_url: String,
    userinfo_url: String,
    scope: String,
    redirect_uri: String,
    http: reqwest::Client,
}

impl OAuthClient {
    /// Register the GitHub app, if credentials are configured
    pub fn github(config: &AppConfig, http: reqwest::Client) -> Option<Self> {
        let (client_id, client_secret) = config.github.credentials()?;
        let provider = Provider::GitHub;

        Some(Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            authorize_url: config.github.authorize_url.clone(),
            token_url: config.github.token_url.clone(),
            userinfo_url: config.github.userinfo_url.clone(),
            scope: config.github.scope.clone(),
            redirect_uri: format!("{}/{}/callback", config.server.base_url(), provider),
            http,
        })
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Provider authorize URL the browser is sent to
    pub fn authorize_url(&self, state: &str) -> Result<String, AppError> {
        let url = url::Url::parse_with_params(
            &self.authorize_url,
            &[
                ("response_type", "code"),
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", self.scope.as_str()),
                ("state", state),
            ],
        )
        .map_err(|e| AppError::Config(format!("invalid authorize URL: {e}")))?;

        Ok(url.into())
    }

    /// Exchange an authorization code for an access token
    pub async fn exchange_code(&self, code: &str) -> Result<String, AppError> {
        let response: TokenResponse = self
            .http
            .post(&self.token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("grant_type", "authorization_code"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = response.error {
            let description = response.error_description.unwrap_or_default();
            return Err(AppError::Upstream(format!("{error}: {description}")));
        }

        response
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::Upstream("token response without access_token".to_string()))
    }

    /// Fetch the profile of the token's owner
    pub async fn fetch_user(&self, access_token: &str) -> Result<ProviderUser, AppError> {
        let user: GitHubUser = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(user.into())
    }

    /// Complete the callback: code → token → profile
    pub async fn callback(&self, code: &str) -> Result<ProviderUser, AppError> {
        let access_token = self.exchange_code(code).await?;
        self.fetch_user(&access_token).await
    }
}

/// All registered providers
#[derive(Debug, Clone, Default)]
pub struct OAuthProviders {
    github: Option<OAuthClient>,
}

impl OAuthProviders {
    pub fn from_config(config: &AppConfig, http: reqwest::Client) -> Self {
        Self {
            github: OAuthClient::github(config, http),
        }
    }

    /// Client for `provider`
    ///
    /// # Errors
    /// `Config` (500) when the provider has no registered app
    pub fn client(&self, provider: Provider) -> Result<&OAuthClient, AppError> {
        let client = match provider {
            Provider::GitHub => self.github.as_ref(),
        };

        client.ok_or_else(|| AppError::Config(format!("{provider} OAuth is not configured")))
    }
}
