//! Database repository for contact inquiries.

use sqlx::{PgConnection, Postgres, QueryBuilder};
use tracing::instrument;

use crate::{
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::inquiries::{ContactInquiry, InquiryCreateDBRequest, InquiryFilter, InquiryStatus, InquiryUpdateDBRequest},
        persistence::{ListOrder, ListQuery},
    },
    types::{InquiryId, abbrev_uuid},
};

const INQUIRY_COLUMNS: &str = "id, name, email, company, project_type, budget_range, message, status, created_at";

pub struct Inquiries<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Inquiries<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Inquiries<'c> {
    type Row = ContactInquiry;

    #[instrument(skip(self, request), err)]
    async fn create(&mut self, request: &InquiryCreateDBRequest) -> Result<Self::Row> {
        let sql = format!(
            r#"
            INSERT INTO contact_inquiries (name, email, company, project_type, budget_range, message, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {INQUIRY_COLUMNS}
            "#
        );

        let inquiry = sqlx::query_as::<_, ContactInquiry>(&sql)
            .bind(&request.name)
            .bind(&request.email)
            .bind(&request.company)
            .bind(&request.project_type)
            .bind(&request.budget_range)
            .bind(&request.message)
            .bind(InquiryStatus::New)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(inquiry)
    }

    #[instrument(skip(self), fields(inquiry_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: InquiryId) -> Result<Option<Self::Row>> {
        let sql = format!("SELECT {INQUIRY_COLUMNS} FROM contact_inquiries WHERE id = $1");
        let inquiry = sqlx::query_as::<_, ContactInquiry>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(inquiry)
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit), err)]
    async fn list(&mut self, filter: &ListQuery<InquiryFilter>) -> Result<Vec<Self::Row>> {
        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {INQUIRY_COLUMNS} FROM contact_inquiries WHERE TRUE"));

        if let Some(status) = filter.filter.status {
            query.push(" AND status = ").push_bind(status);
        }

        query.push(match filter.order {
            ListOrder::Natural | ListOrder::NewestFirst => " ORDER BY created_at DESC",
        });

        if let Some(limit) = filter.limit {
            query.push(" LIMIT ").push_bind(limit);
        }

        let inquiries = query.build_query_as::<ContactInquiry>().fetch_all(&mut *self.db).await?;
        Ok(inquiries)
    }

    #[instrument(skip(self), fields(inquiry_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: InquiryId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM contact_inquiries WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(inquiry_id = %abbrev_uuid(&id), status = %request.status), err)]
    async fn update(&mut self, id: InquiryId, request: &InquiryUpdateDBRequest) -> Result<Self::Row> {
        let sql = format!("UPDATE contact_inquiries SET status = $2 WHERE id = $1 RETURNING {INQUIRY_COLUMNS}");

        let inquiry = sqlx::query_as::<_, ContactInquiry>(&sql)
            .bind(id)
            .bind(request.status)
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;

        Ok(inquiry)
    }

    #[instrument(skip(self), err)]
    async fn count(&mut self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM contact_inquiries")
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
    async fn test_new_inquiries_start_as_new(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Inquiries::new(&mut conn);

        let inquiry = repo
            .create(&InquiryCreateDBRequest {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                company: None,
                project_type: Some("web".to_string()),
                budget_range: None,
                message: "Hello".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(inquiry.status, InquiryStatus::New);

        let updated = repo
            .update(
                inquiry.id,
                &InquiryUpdateDBRequest {
                    status: InquiryStatus::Contacted,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, InquiryStatus::Contacted);
    }
}
