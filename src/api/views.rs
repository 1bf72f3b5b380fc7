//! Server-rendered pages

use axum::{
    Router,
    extract::State,
    middleware,
    response::{Html, IntoResponse},
    routing::get,
};
use html_escape::encode_text;

use crate::AppState;
use crate::auth::{CurrentUser, redirect_unauthorized};
use crate::data::User;
use crate::error::AppError;

/// Public pages
pub fn home_router() -> Router<AppState> {
    Router::new().route("/", get(home))
}

/// Pages behind login
///
/// Unauthenticated requests are redirected to `/` instead of getting a
/// bare 401.
pub fn app_router() -> Router<AppState> {
    Router::new()
        .route("/app", get(dashboard))
        .route_layer(middleware::from_fn(redirect_unauthorized))
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title} - Octogate</title>
    <link rel="stylesheet" href="/static/style.css">
</head>
<body>
    <main>
{body}
    </main>
</body>
</html>
"#
    )
}

/// GET /
async fn home() -> impl IntoResponse {
    Html(render_home())
}

/// GET /app
async fn dashboard(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let user = state.db.get_user(&user_id).await?.ok_or(AppError::NotFound)?;
    Ok(Html(render_dashboard(&user)))
}

pub fn render_home() -> String {
    layout(
        "Welcome",
        r#"        <h1>Octogate</h1>
        <p>Please sign in to continue.</p>
        <a class="button" href="/github/login">Sign in with GitHub</a>"#,
    )
}

pub fn render_dashboard(user: &User) -> String {
    let display_name = user.name.as_deref().unwrap_or(&user.login);
    let email = user
        .email
        .as_deref()
        .map(|email| format!("        <p class=\"email\">{}</p>\n", encode_text(email)))
        .unwrap_or_default();

    let body = format!(
        r#"        <h1>Hello, {name}</h1>
        <p class="login">@{login} via {provider}</p>
{email}        <p class="created">Member since {created}</p>
        <a class="button" href="/logout">Log out</a>"#,
        name = encode_text(display_name),
        login = encode_text(&user.login),
        provider = encode_text(&user.provider),
        email = email,
        created = user.created.format("%Y-%m-%d"),
    );

    layout("Dashboard", &body)
}
