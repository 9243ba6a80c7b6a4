//! API models for admin accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::models::users::UserAccount;
use crate::types::UserId;

pub use crate::db::models::users::Role;

/// The signed-in account for the current request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CurrentUser {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub email: String,
    pub is_admin: bool,
    pub roles: Vec<Role>,
}

/// Account details returned by the authentication endpoints. The password hash never leaves the
/// server.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub email: String,
    pub is_admin: bool,
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
}

impl From<UserAccount> for UserResponse {
    fn from(account: UserAccount) -> Self {
        Self {
            id: account.id,
            is_admin: account.is_admin(),
            email: account.email,
            roles: account.roles,
            created_at: account.created_at,
        }
    }
}

impl From<UserResponse> for CurrentUser {
    fn from(user: UserResponse) -> Self {
        Self {
            id: user.id,
            email: user.email,
            is_admin: user.is_admin,
            roles: user.roles,
        }
    }
}
