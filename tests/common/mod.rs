//! Common test utilities for E2E tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    Form, Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use octogate::{AppState, config};
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const GOOD_CODE: &str = "good-code";
const ACCESS_TOKEN: &str = "gho_test_token";

/// Stand-in for GitHub's token and user endpoints
#[derive(Clone)]
pub struct MockProvider {
    pub addr: String,
    profile: Arc<Mutex<serde_json::Value>>,
}

impl MockProvider {
    pub async fn start() -> Self {
        let profile = Arc::new(Mutex::new(serde_json::json!({
            "id": 42,
            "login": "octocat",
            "name": "The Octocat",
            "email": "octo@example.com",
        })));

        let app = Router::new()
            .route("/login/oauth/access_token", post(token))
            .route("/user", get(user))
            .with_state(profile.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = format!("http://{}", listener.local_addr().unwrap());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, profile }
    }

    /// Change what the next userinfo request returns
    pub fn set_profile(&self, profile: serde_json::Value) {
        *self.profile.lock().unwrap() = profile;
    }
}

async fn token(Form(form): Form<HashMap<String, String>>) -> impl IntoResponse {
    if form.get("code").map(String::as_str) == Some(GOOD_CODE)
        && form.get("client_id").map(String::as_str) == Some("test-client-id")
        && form.get("client_secret").map(String::as_str) == Some("test-client-secret")
    {
        Json(serde_json::json!({
            "access_token": ACCESS_TOKEN,
            "token_type": "bearer",
            "scope": "user:email",
        }))
    } else {
        Json(serde_json::json!({
            "error": "bad_verification_code",
            "error_description": "The code passed is incorrect or expired.",
        }))
    }
}

async fn user(
    State(profile): State<Arc<Mutex<serde_json::Value>>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        == Some(format!("Bearer {ACCESS_TOKEN}").as_str());

    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "message": "Bad credentials" })),
        );
    }

    let profile = profile.lock().unwrap().clone();
    (StatusCode::OK, Json(profile))
}

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub provider: Option<MockProvider>,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Server with GitHub OAuth pointed at a mock provider
    pub async fn new() -> Self {
        let provider = MockProvider::start().await;
        Self::start(Some(provider)).await
    }

    /// Server without OAuth credentials
    pub async fn without_github() -> Self {
        Self::start(None).await
    }

    async fn start(provider: Option<MockProvider>) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let github = match &provider {
            Some(provider) => config::GitHubOAuthConfig {
                client_id: Some("test-client-id".to_string()),
                client_secret: Some("test-client-secret".to_string()),
                authorize_url: "https://github.com/login/oauth/authorize".to_string(),
                token_url: format!("{}/login/oauth/access_token", provider.addr),
                userinfo_url: format!("{}/user", provider.addr),
                scope: "user:email".to_string(),
            },
            None => config::GitHubOAuthConfig::default(),
        };

        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                app_url: "https://test.example.com".to_string(),
                static_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/static").to_string(),
            },
            database: config::DatabaseConfig {
                url: format!("sqlite://{}", db_path.display()),
            },
            auth: config::AuthConfig {
                session_key: "test-secret-key-32-bytes-long!!!".to_string(),
            },
            github,
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        let state = AppState::new(config).await.unwrap();

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = format!("http://{}", listener.local_addr().unwrap());

        let app = octogate::build_router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            provider,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Start the OAuth flow; returns (state param, oauth_state cookie value)
    pub async fn begin_login(&self) -> (String, String) {
        let response = self
            .client
            .get(self.url("/github/login"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 302);

        let location = location(&response);
        let state = url::Url::parse(&location)
            .unwrap()
            .query_pairs()
            .find(|(key, _)| key == "state")
            .map(|(_, value)| value.into_owned())
            .expect("state param");
        let cookie = cookie_value(&response, "oauth_state").expect("oauth_state cookie");

        (state, cookie)
    }

    /// Run the OAuth callback with the given code
    pub async fn callback(&self, code: &str) -> reqwest::Response {
        let (state, cookie) = self.begin_login().await;

        self.client
            .get(self.url("/github/callback"))
            .query(&[("code", code), ("state", state.as_str())])
            .header("Cookie", format!("oauth_state={cookie}"))
            .send()
            .await
            .unwrap()
    }

    /// Complete a full login and return the session id
    pub async fn login(&self) -> String {
        let response = self.callback(GOOD_CODE).await;
        assert_eq!(response.status(), 302);
        cookie_value(&response, "session_id").expect("session_id cookie")
    }

    /// GET with a session cookie
    pub async fn get_with_session(&self, path: &str, session_id: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .header("Cookie", format!("session_id={session_id}"))
            .send()
            .await
            .unwrap()
    }
}

/// Location header of a redirect
pub fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .expect("location header")
        .to_string()
}

/// All Set-Cookie headers of a response
pub fn set_cookies(response: &reqwest::Response) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok().map(ToString::to_string))
        .collect()
}

/// Value of the named cookie in Set-Cookie headers
pub fn cookie_value(response: &reqwest::Response, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    set_cookies(response).into_iter().find_map(|header| {
        let pair = header.split(';').next()?.trim();
        pair.strip_prefix(&prefix)
            .filter(|value| !value.is_empty())
            .map(ToString::to_string)
    })
}
