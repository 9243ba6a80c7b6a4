//! Table-level data access shared by the content repositories.

use async_trait::async_trait;
use uuid::Uuid;

use crate::db::{
    errors::Result,
    persistence::{ListQuery, Record},
};

pub type Create<R> = <R as Record>::Create;
pub type Update<R> = <R as Record>::Update;
pub type Filter<R> = <R as Record>::Filter;

/// Single-statement access to one table through a borrowed connection or transaction.
///
/// [`PgPersistence`](crate::db::persistence::PgPersistence) checks out a connection per call and
/// hands it to the repository for the record type.
#[async_trait]
pub trait Repository {
    type Row: Record;

    async fn create(&mut self, request: &Create<Self::Row>) -> Result<Self::Row>;

    async fn get_by_id(&mut self, id: Uuid) -> Result<Option<Self::Row>>;

    /// Rows matching the filter, in the requested order, up to the limit
    async fn list(&mut self, filter: &ListQuery<Filter<Self::Row>>) -> Result<Vec<Self::Row>>;

    /// `false` when no row had this id
    async fn delete(&mut self, id: Uuid) -> Result<bool>;

    /// Fails with [`DbError::NotFound`](crate::db::errors::DbError::NotFound) when no row had this id
    async fn update(&mut self, id: Uuid, request: &Update<Self::Row>) -> Result<Self::Row>;

    async fn count(&mut self) -> Result<i64>;
}
