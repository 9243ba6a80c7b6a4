//! Database repository for newsletter subscribers.

use sqlx::{PgConnection, Postgres, QueryBuilder};
use tracing::instrument;

use crate::{
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::subscribers::{Subscriber, SubscriberCreateDBRequest, SubscriberFilter, SubscriberUpdateDBRequest},
        persistence::{ListOrder, ListQuery},
    },
    types::{SubscriberId, abbrev_uuid},
};

const SUBSCRIBER_COLUMNS: &str = "id, email, is_active, subscribed_at, unsubscribed_at";

pub struct Subscribers<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Subscribers<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Subscribers<'c> {
    type Row = Subscriber;

    #[instrument(skip(self, request), err)]
    async fn create(&mut self, request: &SubscriberCreateDBRequest) -> Result<Self::Row> {
        let sql = format!("INSERT INTO newsletter_subscribers (email) VALUES ($1) RETURNING {SUBSCRIBER_COLUMNS}");

        let subscriber = sqlx::query_as::<_, Subscriber>(&sql)
            .bind(&request.email)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(subscriber)
    }

    #[instrument(skip(self), fields(subscriber_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: SubscriberId) -> Result<Option<Self::Row>> {
        let sql = format!("SELECT {SUBSCRIBER_COLUMNS} FROM newsletter_subscribers WHERE id = $1");
        let subscriber = sqlx::query_as::<_, Subscriber>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(subscriber)
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit), err)]
    async fn list(&mut self, filter: &ListQuery<SubscriberFilter>) -> Result<Vec<Self::Row>> {
        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {SUBSCRIBER_COLUMNS} FROM newsletter_subscribers WHERE TRUE"));

        if let Some(active) = filter.filter.active {
            query.push(" AND is_active = ").push_bind(active);
        }

        query.push(match filter.order {
            ListOrder::Natural | ListOrder::NewestFirst => " ORDER BY subscribed_at DESC",
        });

        if let Some(limit) = filter.limit {
            query.push(" LIMIT ").push_bind(limit);
        }

        let subscribers = query.build_query_as::<Subscriber>().fetch_all(&mut *self.db).await?;
        Ok(subscribers)
    }

    #[instrument(skip(self), fields(subscriber_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: SubscriberId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM newsletter_subscribers WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(subscriber_id = %abbrev_uuid(&id), active = request.is_active), err)]
    async fn update(&mut self, id: SubscriberId, request: &SubscriberUpdateDBRequest) -> Result<Self::Row> {
        let sql = format!(
            r#"
            UPDATE newsletter_subscribers SET
                is_active = $2,
                unsubscribed_at = CASE WHEN $2 THEN NULL ELSE COALESCE(unsubscribed_at, NOW()) END
            WHERE id = $1
            RETURNING {SUBSCRIBER_COLUMNS}
            "#
        );

        let subscriber = sqlx::query_as::<_, Subscriber>(&sql)
            .bind(id)
            .bind(request.is_active)
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;

        Ok(subscriber)
    }

    #[instrument(skip(self), err)]
    async fn count(&mut self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM newsletter_subscribers")
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_duplicate_email_and_unsubscribe(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Subscribers::new(&mut conn);
        let request = SubscriberCreateDBRequest {
            email: "reader@example.com".to_string(),
        };

        let subscriber = repo.create(&request).await.unwrap();
        assert!(subscriber.is_active);

        let err = repo.create(&request).await.unwrap_err();
        assert!(err.is_unique_violation());

        let updated = repo
            .update(subscriber.id, &SubscriberUpdateDBRequest { is_active: false })
            .await
            .unwrap();
        assert!(!updated.is_active);
        assert!(updated.unsubscribed_at.is_some());
    }
}
