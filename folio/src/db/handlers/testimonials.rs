//! Database repository for testimonials.

use sqlx::{PgConnection, Postgres, QueryBuilder};
use tracing::instrument;

use crate::{
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::testimonials::{Testimonial, TestimonialFields, TestimonialFilter},
        persistence::{ListOrder, ListQuery},
    },
    types::{TestimonialId, abbrev_uuid},
};

const TESTIMONIAL_COLUMNS: &str =
    "id, quote, author_name, author_role, author_company, author_image_url, rating, is_featured, display_order, created_at";

pub struct Testimonials<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Testimonials<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Testimonials<'c> {
    type Row = Testimonial;

    #[instrument(skip(self, request), fields(author = %request.author_name), err)]
    async fn create(&mut self, request: &TestimonialFields) -> Result<Self::Row> {
        let sql = format!(
            r#"
            INSERT INTO testimonials (
                quote, author_name, author_role, author_company, author_image_url, rating, is_featured, display_order
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {TESTIMONIAL_COLUMNS}
            "#
        );

        let testimonial = sqlx::query_as::<_, Testimonial>(&sql)
            .bind(&request.quote)
            .bind(&request.author_name)
            .bind(&request.author_role)
            .bind(&request.author_company)
            .bind(&request.author_image_url)
            .bind(request.rating)
            .bind(request.is_featured)
            .bind(request.display_order)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(testimonial)
    }

    #[instrument(skip(self), fields(testimonial_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: TestimonialId) -> Result<Option<Self::Row>> {
        let sql = format!("SELECT {TESTIMONIAL_COLUMNS} FROM testimonials WHERE id = $1");
        let testimonial = sqlx::query_as::<_, Testimonial>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(testimonial)
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit), err)]
    async fn list(&mut self, filter: &ListQuery<TestimonialFilter>) -> Result<Vec<Self::Row>> {
        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {TESTIMONIAL_COLUMNS} FROM testimonials WHERE TRUE"));

        if let Some(featured) = filter.filter.featured {
            query.push(" AND is_featured = ").push_bind(featured);
        }

        query.push(match filter.order {
            ListOrder::Natural => " ORDER BY display_order ASC, created_at DESC",
            ListOrder::NewestFirst => " ORDER BY created_at DESC",
        });

        if let Some(limit) = filter.limit {
            query.push(" LIMIT ").push_bind(limit);
        }

        let testimonials = query.build_query_as::<Testimonial>().fetch_all(&mut *self.db).await?;
        Ok(testimonials)
    }

    #[instrument(skip(self), fields(testimonial_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: TestimonialId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM testimonials WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(testimonial_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: TestimonialId, request: &TestimonialFields) -> Result<Self::Row> {
        let sql = format!(
            r#"
            UPDATE testimonials SET
                quote = $2, author_name = $3, author_role = $4, author_company = $5,
                author_image_url = $6, rating = $7, is_featured = $8, display_order = $9
            WHERE id = $1
            RETURNING {TESTIMONIAL_COLUMNS}
            "#
        );

        let testimonial = sqlx::query_as::<_, Testimonial>(&sql)
            .bind(id)
            .bind(&request.quote)
            .bind(&request.author_name)
            .bind(&request.author_role)
            .bind(&request.author_company)
            .bind(&request.author_image_url)
            .bind(request.rating)
            .bind(request.is_featured)
            .bind(request.display_order)
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;

        Ok(testimonial)
    }

    #[instrument(skip(self), err)]
    async fn count(&mut self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM testimonials")
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
    async fn test_featured_filter_and_rating_check(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Testimonials::new(&mut conn);

        let featured = repo
            .create(&TestimonialFields {
                quote: "Shipped on time".to_string(),
                author_name: "Sam".to_string(),
                is_featured: true,
                ..Default::default()
            })
            .await
            .unwrap();
        repo.create(&TestimonialFields {
            quote: "Solid work".to_string(),
            author_name: "Alex".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

        let listed = repo
            .list(&ListQuery::new(TestimonialFilter { featured: Some(true) }))
            .await
            .unwrap();
        assert_eq!(listed, vec![featured.clone()]);
        assert_eq!(featured.rating, 5);

        let err = repo
            .create(&TestimonialFields {
                quote: "Too good".to_string(),
                author_name: "Eve".to_string(),
                rating: 9,
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));
    }
}
