//! Database record models matching table schemas.
//!
//! Each module holds the row struct (deriving `sqlx::FromRow`), the payloads used to insert and
//! update it, and its list filter. Row structs are also what the public API serializes, so they
//! derive `ToSchema`.
//!
//! - [`projects`], [`testimonials`], [`blogs`]: Public content curated in the admin area
//! - [`inquiries`], [`subscribers`]: Rows written by the public forms
//! - [`users`]: Admin accounts and roles

pub mod blogs;
pub mod inquiries;
pub mod projects;
pub mod subscribers;
pub mod testimonials;
pub mod users;
