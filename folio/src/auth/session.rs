//! Session tokens and the cookie that carries them.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};

use crate::{
    api::models::users::{CurrentUser, Role},
    config::Config,
    errors::Error,
    types::UserId,
};

/// Claims of a session token. Admin status is derived from `roles` when the token is read back.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: UserId,
    pub email: String,
    pub roles: Vec<Role>,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    pub fn new(user: &CurrentUser, config: &Config) -> Self {
        let issued_at = Utc::now();
        Self {
            sub: user.id,
            email: user.email.clone(),
            roles: user.roles.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + config.auth.security.jwt_expiry).timestamp(),
        }
    }
}

impl From<SessionClaims> for CurrentUser {
    fn from(claims: SessionClaims) -> Self {
        Self {
            id: claims.sub,
            is_admin: claims.roles.contains(&Role::Admin),
            email: claims.email,
            roles: claims.roles,
        }
    }
}

fn signing_secret(config: &Config) -> Result<&[u8], Error> {
    match config.secret_key.as_deref() {
        Some(secret) if !secret.is_empty() => Ok(secret.as_bytes()),
        _ => Err(Error::Internal {
            operation: "sign session: secret_key is not configured".to_string(),
        }),
    }
}

/// Anything wrong with the token a client sent is a 401; key or library trouble is ours.
fn classify(err: jsonwebtoken::errors::Error) -> Error {
    match err.kind() {
        ErrorKind::InvalidToken
        | ErrorKind::InvalidSignature
        | ErrorKind::ExpiredSignature
        | ErrorKind::ImmatureSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::MissingRequiredClaim(_)
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_) => Error::Unauthenticated { message: None },
        _ => Error::Internal {
            operation: format!("verify session token: {err}"),
        },
    }
}

/// Issue an HS256 token for `user`, valid for `auth.security.jwt_expiry`.
pub fn create_session_token(user: &CurrentUser, config: &Config) -> Result<String, Error> {
    let claims = SessionClaims::new(user, config);
    let key = EncodingKey::from_secret(signing_secret(config)?);

    encode(&Header::new(Algorithm::HS256), &claims, &key).map_err(|e| Error::Internal {
        operation: format!("sign session token: {e}"),
    })
}

pub fn verify_session_token(token: &str, config: &Config) -> Result<CurrentUser, Error> {
    let key = DecodingKey::from_secret(signing_secret(config)?);
    let claims = decode::<SessionClaims>(token, &key, &Validation::new(Algorithm::HS256))
        .map_err(classify)?
        .claims;

    Ok(claims.into())
}

/// `Set-Cookie` value carrying a freshly issued session token
pub fn session_cookie(token: &str, config: &Config) -> String {
    let session = &config.auth.session;
    format!(
        "{}={}; Path=/; HttpOnly;{} SameSite={}; Max-Age={}",
        session.cookie_name,
        token,
        if session.cookie_secure { " Secure;" } else { "" },
        same_site(&session.cookie_same_site),
        session.timeout.as_secs()
    )
}

/// `Set-Cookie` value that removes the session cookie
pub fn cleared_session_cookie(config: &Config) -> String {
    let session = &config.auth.session;
    format!(
        "{}=; Path=/; HttpOnly;{} SameSite={}; Max-Age=0",
        session.cookie_name,
        if session.cookie_secure { " Secure;" } else { "" },
        same_site(&session.cookie_same_site)
    )
}

fn same_site(value: &str) -> &'static str {
    match value.to_lowercase().as_str() {
        "lax" => "Lax",
        "none" => "None",
        _ => "Strict",
    }
}
