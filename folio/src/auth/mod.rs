//! Admin sign-in.
//!
//! `/authentication/login` checks an Argon2id password hash ([`password`]) and answers with an
//! HS256 session token in an HTTP-only cookie ([`session`]). Handlers take [`current_user::RequireAdmin`]
//! to demand that cookie and the admin role:
//!
//! ```ignore
//! async fn dashboard(RequireAdmin(user): RequireAdmin) -> String {
//!     format!("signed in as {}", user.email)
//! }
//! ```

pub mod current_user;
pub mod password;
pub mod session;
