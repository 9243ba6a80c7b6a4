//! Storage-agnostic persistence adapter.
//!
//! Controllers never talk to Postgres directly. They hold an `Arc<dyn Persistence<R>>` for each
//! table they touch, which is either backed by the sqlx repositories in [`crate::db::handlers`]
//! or by the in-memory store in [`crate::db::in_memory`]. Every operation is a single round trip
//! and errors are classified into [`DbError`] so callers can tell duplicates and missing rows
//! apart from everything else.

use std::{marker::PhantomData, sync::Arc};

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{
    errors::{DbError, Result},
    handlers::{Blogs, Inquiries, Projects, Repository, Subscribers, Testimonials, Users},
    models::{
        blogs::BlogPost,
        inquiries::ContactInquiry,
        projects::Project,
        subscribers::Subscriber,
        testimonials::Testimonial,
        users::{UserAccount, UserCreateDBRequest},
    },
};
use crate::types::UserId;

/// A row type that can be stored through a [`Persistence`] adapter.
pub trait Record: Clone + Send + Sync + 'static {
    /// Payload for inserting a new row
    type Create: Send + Sync;
    /// Payload for updating an existing row
    type Update: Send + Sync;
    /// Per-table list filter
    type Filter: Default + Clone + Send + Sync;

    /// Table name, used for logging and constraint attribution
    const TABLE: &'static str;

    fn id(&self) -> Uuid;

    /// The adapter for this record type inside a [`Stores`] bundle
    fn store(stores: &Stores) -> &Arc<dyn Persistence<Self>>;
}

/// Ordering applied to list operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListOrder {
    /// The table's natural order: `display_order` for curated content, newest first otherwise
    #[default]
    Natural,
    /// Most recently created first
    NewestFirst,
}

/// Filter, ordering and limit for a list operation.
#[derive(Debug, Clone, Default)]
pub struct ListQuery<F> {
    pub filter: F,
    pub order: ListOrder,
    pub limit: Option<i64>,
}

impl<F> ListQuery<F> {
    pub fn new(filter: F) -> Self {
        Self {
            filter,
            order: ListOrder::Natural,
            limit: None,
        }
    }

    pub fn newest_first(mut self) -> Self {
        self.order = ListOrder::NewestFirst;
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Insert/update/delete/list access to one table.
#[async_trait]
pub trait Persistence<R: Record>: Send + Sync {
    async fn insert(&self, request: &R::Create) -> Result<R>;

    /// Fails with [`DbError::NotFound`] when no row has this id
    async fn update(&self, id: Uuid, request: &R::Update) -> Result<R>;

    /// Fails with [`DbError::NotFound`] when no row has this id
    async fn delete(&self, id: Uuid) -> Result<()>;

    async fn get(&self, id: Uuid) -> Result<Option<R>>;

    async fn list(&self, query: &ListQuery<R::Filter>) -> Result<Vec<R>>;

    async fn count(&self) -> Result<i64>;
}

/// Admin account lookups used by login and startup.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>>;

    /// Create an admin account, or refresh the password of an existing one when a hash is given.
    async fn ensure_admin(&self, email: &str, password_hash: Option<String>) -> Result<UserId>;
}

/// One adapter per table, shared across requests.
#[derive(Clone)]
pub struct Stores {
    pub projects: Arc<dyn Persistence<Project>>,
    pub testimonials: Arc<dyn Persistence<Testimonial>>,
    pub blogs: Arc<dyn Persistence<BlogPost>>,
    pub inquiries: Arc<dyn Persistence<ContactInquiry>>,
    pub subscribers: Arc<dyn Persistence<Subscriber>>,
    pub accounts: Arc<dyn AccountStore>,
}

impl Stores {
    /// Adapters backed by the sqlx repositories
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            projects: Arc::new(PgPersistence::<Project>::new(pool.clone())),
            testimonials: Arc::new(PgPersistence::<Testimonial>::new(pool.clone())),
            blogs: Arc::new(PgPersistence::<BlogPost>::new(pool.clone())),
            inquiries: Arc::new(PgPersistence::<ContactInquiry>::new(pool.clone())),
            subscribers: Arc::new(PgPersistence::<Subscriber>::new(pool.clone())),
            accounts: Arc::new(PgAccounts { pool }),
        }
    }
}

/// [`Persistence`] implementation that checks out a pooled connection per call and hands it to
/// the table's repository.
pub struct PgPersistence<R> {
    pool: PgPool,
    _record: PhantomData<fn() -> R>,
}

impl<R> PgPersistence<R> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _record: PhantomData,
        }
    }
}

macro_rules! pg_persistence {
    ($record:ty, $repo:ident) => {
        #[async_trait]
        impl Persistence<$record> for PgPersistence<$record> {
            async fn insert(&self, request: &<$record as Record>::Create) -> Result<$record> {
                let mut conn = self.pool.acquire().await?;
                $repo::new(&mut conn).create(request).await
            }

            async fn update(&self, id: Uuid, request: &<$record as Record>::Update) -> Result<$record> {
                let mut conn = self.pool.acquire().await?;
                $repo::new(&mut conn).update(id, request).await
            }

            async fn delete(&self, id: Uuid) -> Result<()> {
                let mut conn = self.pool.acquire().await?;
                if $repo::new(&mut conn).delete(id).await? {
                    Ok(())
                } else {
                    Err(DbError::NotFound)
                }
            }

            async fn get(&self, id: Uuid) -> Result<Option<$record>> {
                let mut conn = self.pool.acquire().await?;
                $repo::new(&mut conn).get_by_id(id).await
            }

            async fn list(&self, query: &ListQuery<<$record as Record>::Filter>) -> Result<Vec<$record>> {
                let mut conn = self.pool.acquire().await?;
                $repo::new(&mut conn).list(query).await
            }

            async fn count(&self) -> Result<i64> {
                let mut conn = self.pool.acquire().await?;
                $repo::new(&mut conn).count().await
            }
        }
    };
}

pg_persistence!(Project, Projects);
pg_persistence!(Testimonial, Testimonials);
pg_persistence!(BlogPost, Blogs);
pg_persistence!(ContactInquiry, Inquiries);
pg_persistence!(Subscriber, Subscribers);

/// [`AccountStore`] backed by the `users` and `user_roles` tables.
pub struct PgAccounts {
    pool: PgPool,
}

#[async_trait]
impl AccountStore for PgAccounts {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>> {
        let mut conn = self.pool.acquire().await?;
        Users::new(&mut conn).get_user_by_email(email).await
    }

    async fn ensure_admin(&self, email: &str, password_hash: Option<String>) -> Result<UserId> {
        // Use a transaction so the user row and its role land together
        let mut tx = self.pool.begin().await?;
        let mut users = Users::new(&mut tx);

        let user_id = match users.get_user_by_email(email).await? {
            Some(existing) => {
                if let Some(hash) = password_hash.as_deref() {
                    users.set_password_hash(existing.id, hash).await?;
                }
                users.grant_admin(existing.id).await?;
                existing.id
            }
            None => {
                let created = users
                    .create(&UserCreateDBRequest {
                        email: email.to_string(),
                        password_hash,
                        is_admin: true,
                    })
                    .await?;
                created.id
            }
        };

        tx.commit().await?;
        Ok(user_id)
    }
}
