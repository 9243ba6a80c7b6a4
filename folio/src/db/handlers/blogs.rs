//! Database repository for blog posts.

use sqlx::{PgConnection, Postgres, QueryBuilder};
use tracing::instrument;

use crate::{
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::blogs::{BlogFields, BlogFilter, BlogPost},
        persistence::{ListOrder, ListQuery},
    },
    types::{BlogId, abbrev_uuid},
};

const BLOG_COLUMNS: &str = "id, title, slug, excerpt, content, category, image_url, read_time, is_published, published_at, \
     meta_title, meta_description, meta_keywords, created_at, updated_at";

pub struct Blogs<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Blogs<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Blogs<'c> {
    type Row = BlogPost;

    #[instrument(skip(self, request), fields(slug = %request.slug), err)]
    async fn create(&mut self, request: &BlogFields) -> Result<Self::Row> {
        let sql = format!(
            r#"
            INSERT INTO blogs (
                title, slug, excerpt, content, category, image_url, read_time,
                is_published, published_at, meta_title, meta_description, meta_keywords
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {BLOG_COLUMNS}
            "#
        );

        let post = sqlx::query_as::<_, BlogPost>(&sql)
            .bind(&request.title)
            .bind(&request.slug)
            .bind(&request.excerpt)
            .bind(&request.content)
            .bind(&request.category)
            .bind(&request.image_url)
            .bind(&request.read_time)
            .bind(request.is_published)
            .bind(request.published_at)
            .bind(&request.meta_title)
            .bind(&request.meta_description)
            .bind(&request.meta_keywords)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(post)
    }

    #[instrument(skip(self), fields(blog_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: BlogId) -> Result<Option<Self::Row>> {
        let sql = format!("SELECT {BLOG_COLUMNS} FROM blogs WHERE id = $1");
        let post = sqlx::query_as::<_, BlogPost>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(post)
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit), err)]
    async fn list(&mut self, filter: &ListQuery<BlogFilter>) -> Result<Vec<Self::Row>> {
        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {BLOG_COLUMNS} FROM blogs WHERE TRUE"));

        if let Some(published) = filter.filter.published {
            query.push(" AND is_published = ").push_bind(published);
        }
        if let Some(slug) = &filter.filter.slug {
            query.push(" AND slug = ").push_bind(slug.clone());
        }

        // Posts have no curated order, so both orderings are newest first
        query.push(match filter.order {
            ListOrder::Natural | ListOrder::NewestFirst => " ORDER BY created_at DESC",
        });

        if let Some(limit) = filter.limit {
            query.push(" LIMIT ").push_bind(limit);
        }

        let posts = query.build_query_as::<BlogPost>().fetch_all(&mut *self.db).await?;
        Ok(posts)
    }

    #[instrument(skip(self), fields(blog_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: BlogId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM blogs WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(blog_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: BlogId, request: &BlogFields) -> Result<Self::Row> {
        let sql = format!(
            r#"
            UPDATE blogs SET
                title = $2, slug = $3, excerpt = $4, content = $5, category = $6, image_url = $7,
                read_time = $8, is_published = $9, published_at = $10,
                meta_title = $11, meta_description = $12, meta_keywords = $13,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {BLOG_COLUMNS}
            "#
        );

        let post = sqlx::query_as::<_, BlogPost>(&sql)
            .bind(id)
            .bind(&request.title)
            .bind(&request.slug)
            .bind(&request.excerpt)
            .bind(&request.content)
            .bind(&request.category)
            .bind(&request.image_url)
            .bind(&request.read_time)
            .bind(request.is_published)
            .bind(request.published_at)
            .bind(&request.meta_title)
            .bind(&request.meta_description)
            .bind(&request.meta_keywords)
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;

        Ok(post)
    }

    #[instrument(skip(self), err)]
    async fn count(&mut self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM blogs")
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count)
    }
}
