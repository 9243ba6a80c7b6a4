//! API request and response data models.
//!
//! API models are distinct from database models. Public content is returned as stored, so only
//! the envelopes and form payloads live here.
//!
//! - [`submissions`]: Contact and newsletter payloads and the submission response
//! - [`admin`]: Success and failure envelopes for the admin API
//! - [`auth`]: Login and logout payloads
//! - [`users`]: The signed-in account

pub mod admin;
pub mod auth;
pub mod submissions;
pub mod users;
