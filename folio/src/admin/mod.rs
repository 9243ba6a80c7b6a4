//! Back office controllers.
//!
//! These are UI-free: every operation takes a [`Notifier`](crate::notifications::Notifier) and
//! reports what happened through it, so the HTTP layer and the tests drive them the same way.
//!
//! - [`crud`]: the generic list and edit dialog controller, with [`projects`], [`testimonials`]
//!   and [`blogs`] providing the per-entity drafts
//! - [`inquiries`]: status triage for contact form submissions
//! - [`dashboard`]: content counts
//! - [`slug`] and [`draft`]: pure helpers shared by the drafts

pub mod blogs;
pub mod crud;
pub mod dashboard;
pub mod draft;
pub mod inquiries;
pub mod projects;
pub mod slug;
pub mod testimonials;
