//! Test helpers: an in-memory application with a seeded admin account, and session cookies.

use axum_test::TestServer;
use uuid::Uuid;

use crate::{
    AppState, Application,
    api::models::users::{CurrentUser, Role, UserResponse},
    auth::session,
    config::{Config, DatabaseConfig, FormsConfig, PasswordConfig},
};

pub const TEST_ADMIN_EMAIL: &str = "admin@test.com";
pub const TEST_ADMIN_PASSWORD: &str = "correct-horse-battery";

/// A valid configuration backed by in-memory stores.
///
/// Metrics are off because the Prometheus recorder is process global and can only be installed
/// once. Argon2 runs with minimal cost to keep the suite fast. `x-forwarded-for` identifies the
/// client, so tests can act as distinct visitors.
pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: None,
        database: DatabaseConfig::Memory,
        admin_email: TEST_ADMIN_EMAIL.to_string(),
        admin_password: Some(TEST_ADMIN_PASSWORD.to_string()),
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        auth: crate::config::AuthConfig {
            password: PasswordConfig {
                argon2_memory_kib: 1024,
                argon2_iterations: 1,
                argon2_parallelism: 1,
                ..Default::default()
            },
            ..Default::default()
        },
        forms: FormsConfig {
            client_key_header: Some("x-forwarded-for".to_string()),
            ..Default::default()
        },
        enable_metrics: false,
        enable_otel_export: false,
    }
}

pub async fn create_test_app() -> (TestServer, AppState) {
    let app = Application::new(create_test_config())
        .await
        .expect("Failed to create application");
    app.into_test_server()
}

/// A `Cookie` header value carrying a session for the account with this email.
pub async fn session_cookie_for(state: &AppState, email: &str) -> String {
    let account = state
        .stores
        .accounts
        .find_by_email(email)
        .await
        .expect("Failed to look up account")
        .expect("Account does not exist");
    let user: CurrentUser = UserResponse::from(account).into();
    cookie_for(state, &user)
}

pub async fn admin_cookie(state: &AppState) -> String {
    session_cookie_for(state, TEST_ADMIN_EMAIL).await
}

/// A signed-in account without the admin role.
pub fn user_cookie(state: &AppState) -> String {
    let user = CurrentUser {
        id: Uuid::new_v4(),
        email: "visitor@test.com".to_string(),
        is_admin: false,
        roles: vec![Role::User],
    };
    cookie_for(state, &user)
}

fn cookie_for(state: &AppState, user: &CurrentUser) -> String {
    let token = session::create_session_token(user, &state.config).expect("Failed to create session token");
    format!("{}={}", state.config.auth.session.cookie_name, token)
}
