//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Public** (`/api/v1/*`): Contact and newsletter forms, projects, testimonials, blog posts
//! - **Authentication** (`/authentication/*`): Login, logout, current session
//! - **Admin** (`/admin/api/v1/*`): Content editing, inquiry triage, subscribers, dashboard
//!
//! API documentation is available at `/admin/docs` when the server is running.

pub mod handlers;
pub mod models;
