//! Database layer for data persistence and access.
//!
//! ```text
//! ┌──────────────────┐
//! │   Controllers    │  (forms, admin)
//! └────────┬─────────┘
//!          │  Arc<dyn Persistence<R>>
//!          ↓
//! ┌──────────────────┐      ┌──────────────────┐
//! │  PgPersistence   │      │  InMemoryStore   │
//! └────────┬─────────┘      └──────────────────┘
//!          │
//!          ↓
//! ┌──────────────────┐
//! │   Repositories   │  (db::handlers - queries per table)
//! └────────┬─────────┘
//!          ↓
//! ┌──────────────────┐
//! │    PostgreSQL    │
//! └──────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`persistence`]: The adapter traits controllers depend on, and the Postgres adapter
//! - [`handlers`]: Repository implementations for CRUD operations
//! - [`in_memory`]: Process-local adapter used in tests and the `memory` database mode
//! - [`models`]: Database record structures matching table schemas
//! - [`errors`]: Database-specific error types
//!
//! ## Example Usage
//!
//! ```ignore
//! use folio::db::handlers::{Projects, Repository};
//! use folio::db::persistence::ListQuery;
//!
//! async fn example(pool: &sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut conn = pool.acquire().await?;
//!     let mut projects = Projects::new(&mut conn);
//!
//!     for project in projects.list(&ListQuery::default()).await? {
//!         println!("{} ({})", project.title, project.slug);
//!     }
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod handlers;
pub mod in_memory;
pub mod models;
pub mod persistence;
