//! HTTP request handlers for all API endpoints.
//!
//! # Handler Modules
//!
//! - [`auth`]: Login, logout and the current session
//! - [`forms`]: Public contact and newsletter submissions
//! - [`content`]: Public read-only content
//! - [`projects`], [`testimonials`], [`blogs`]: Admin content editing
//! - [`inquiries`]: Admin inquiry triage
//! - [`subscribers`]: Admin mailing list view
//! - [`dashboard`]: Admin content counts
//!
//! # Error Handling
//!
//! Public handlers return [`crate::errors::Error`]. Admin handlers return
//! [`AdminFailure`](crate::api::models::admin::AdminFailure), which renders the same status codes
//! plus the notifications emitted before the failure.

pub mod auth;
pub mod blogs;
pub mod content;
pub mod dashboard;
pub(crate) mod editable;
pub mod forms;
pub mod inquiries;
pub mod projects;
pub mod subscribers;
pub mod testimonials;
