//! Repository implementations for database access.
//!
//! Each repository wraps a SQLx connection or transaction, binds parameters for one table and
//! returns the row structs from [`crate::db::models`].
//!
//! # Available Repositories
//!
//! - [`Projects`], [`Testimonials`], [`Blogs`]: Curated public content
//! - [`Inquiries`]: Contact form submissions
//! - [`Subscribers`]: Newsletter signups
//! - [`Users`]: Admin accounts and roles (not a [`Repository`])
//!
//! # Common Pattern
//!
//! ```ignore
//! use folio::db::handlers::{Blogs, Repository};
//!
//! async fn example(pool: &sqlx::PgPool, id: uuid::Uuid) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut conn = pool.acquire().await?;
//!     let mut repo = Blogs::new(&mut conn);
//!
//!     if let Some(post) = repo.get_by_id(id).await? {
//!         println!("{}", post.title);
//!     }
//!     Ok(())
//! }
//! ```

pub mod blogs;
pub mod inquiries;
pub mod projects;
pub mod repository;
pub mod subscribers;
pub mod testimonials;
pub mod users;

pub use blogs::Blogs;
pub use inquiries::Inquiries;
pub use projects::Projects;
pub use repository::Repository;
pub use subscribers::Subscribers;
pub use testimonials::Testimonials;
pub use users::Users;
