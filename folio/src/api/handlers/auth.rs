use axum::{Json, extract::State};

use crate::{
    AppState,
    api::models::{
        auth::{AuthResponse, AuthSuccessResponse, LoginRequest, WithSessionCookie},
        users::{CurrentUser, UserResponse},
    },
    auth::{password, session},
    errors::{Error, Result},
};

fn invalid_credentials() -> Error {
    Error::Unauthenticated {
        message: Some("Invalid email or password".to_string()),
    }
}

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/authentication/login",
    request_body = LoginRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<WithSessionCookie<AuthResponse>> {
    let account = state
        .stores
        .accounts
        .find_by_email(request.email.trim())
        .await?
        .ok_or_else(invalid_credentials)?;

    let password_hash = account.password_hash.clone().ok_or_else(invalid_credentials)?;

    // Argon2 is CPU bound
    let password = request.password;
    let is_valid = tokio::task::spawn_blocking(move || password::verify_password(&password, &password_hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid {
        return Err(invalid_credentials());
    }

    let user_response = UserResponse::from(account);
    let current_user: CurrentUser = user_response.clone().into();
    let token = session::create_session_token(&current_user, &state.config)?;

    tracing::info!(user_id = %current_user.id, "admin signed in");

    Ok(WithSessionCookie {
        body: AuthResponse {
            user: user_response,
            message: "Login successful".to_string(),
        },
        cookie: session::session_cookie(&token, &state.config),
    })
}

/// Sign out by expiring the session cookie
#[utoipa::path(
    post,
    path = "/authentication/logout",
    tag = "authentication",
    responses(
        (status = 200, description = "Logout successful", body = AuthSuccessResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn logout(State(state): State<AppState>) -> Result<WithSessionCookie<AuthSuccessResponse>> {
    Ok(WithSessionCookie {
        body: AuthSuccessResponse {
            message: "Logout successful".to_string(),
        },
        cookie: session::cleared_session_cookie(&state.config),
    })
}

/// The signed-in account
#[utoipa::path(
    get,
    path = "/authentication/me",
    tag = "authentication",
    responses(
        (status = 200, description = "Current user", body = CurrentUser),
        (status = 401, description = "Not signed in"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn me(user: CurrentUser) -> Json<CurrentUser> {
    Json(user)
}
