//! Request extractors for the signed-in account.

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session,
    config::Config,
    errors::{Error, Result},
    types::Operation,
};
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::{instrument, trace};

/// Values of every session cookie on the request. Browsers may send the same name twice when
/// paths differ, so all of them are tried.
fn session_tokens<'a>(parts: &'a Parts, cookie_name: &'a str) -> impl Iterator<Item = &'a str> {
    parts
        .headers
        .get_all(header::COOKIE)
        .into_iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(move |pair| match pair.trim().split_once('=') {
            Some((name, token)) if name == cookie_name => Some(token),
            _ => None,
        })
}

/// `None` without a session cookie, otherwise the first token that verifies or the last failure.
fn session_user(parts: &Parts, config: &Config) -> Option<Result<CurrentUser>> {
    let mut outcome = None;
    for token in session_tokens(parts, &config.auth.session.cookie_name) {
        match session::verify_session_token(token, config) {
            Ok(user) => return Some(Ok(user)),
            Err(e) => outcome = Some(Err(e)),
        }
    }
    outcome
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip_all)]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        match session_user(parts, &state.config) {
            Some(Ok(user)) => {
                trace!(user_id = %user.id, "session verified");
                Ok(user)
            }
            Some(Err(e)) => {
                trace!(error = %e, "session cookie rejected");
                Err(Error::Unauthenticated { message: None })
            }
            None => Err(Error::Unauthenticated { message: None }),
        }
    }
}

pub fn require_admin(user: CurrentUser) -> Result<CurrentUser> {
    if user.is_admin {
        return Ok(user);
    }
    Err(Error::InsufficientPermissions {
        action: Operation::Manage,
        resource: "admin content".to_string(),
    })
}

/// Guard for admin handlers: 401 without a session, 403 for non-admins.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        require_admin(user).map(RequireAdmin)
    }
}
