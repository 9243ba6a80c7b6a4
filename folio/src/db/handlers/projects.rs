//! Database repository for portfolio projects.

use sqlx::{PgConnection, Postgres, QueryBuilder};
use tracing::instrument;

use crate::{
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::projects::{Project, ProjectFields, ProjectFilter},
        persistence::{ListOrder, ListQuery},
    },
    types::{ProjectId, abbrev_uuid},
};

const PROJECT_COLUMNS: &str = "id, title, slug, description, problem, solution, category, industry, image_url, \
     stack_frontend, stack_backend, stack_database, stack_tools, results, is_featured, display_order, \
     testimonial_quote, testimonial_author, testimonial_role, created_at, updated_at";

pub struct Projects<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Projects<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Projects<'c> {
    type Row = Project;

    #[instrument(skip(self, request), fields(slug = %request.slug), err)]
    async fn create(&mut self, request: &ProjectFields) -> Result<Self::Row> {
        let sql = format!(
            r#"
            INSERT INTO projects (
                title, slug, description, problem, solution, category, industry, image_url,
                stack_frontend, stack_backend, stack_database, stack_tools, results,
                is_featured, display_order, testimonial_quote, testimonial_author, testimonial_role
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING {PROJECT_COLUMNS}
            "#
        );

        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(&request.title)
            .bind(&request.slug)
            .bind(&request.description)
            .bind(&request.problem)
            .bind(&request.solution)
            .bind(&request.category)
            .bind(&request.industry)
            .bind(&request.image_url)
            .bind(&request.stack_frontend)
            .bind(&request.stack_backend)
            .bind(&request.stack_database)
            .bind(&request.stack_tools)
            .bind(&request.results)
            .bind(request.is_featured)
            .bind(request.display_order)
            .bind(&request.testimonial_quote)
            .bind(&request.testimonial_author)
            .bind(&request.testimonial_role)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(project)
    }

    #[instrument(skip(self), fields(project_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: ProjectId) -> Result<Option<Self::Row>> {
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");
        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(project)
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit), err)]
    async fn list(&mut self, filter: &ListQuery<ProjectFilter>) -> Result<Vec<Self::Row>> {
        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE TRUE"));

        if let Some(featured) = filter.filter.featured {
            query.push(" AND is_featured = ").push_bind(featured);
        }
        if let Some(slug) = &filter.filter.slug {
            query.push(" AND slug = ").push_bind(slug.clone());
        }

        query.push(match filter.order {
            ListOrder::Natural => " ORDER BY display_order ASC, created_at DESC",
            ListOrder::NewestFirst => " ORDER BY created_at DESC",
        });

        if let Some(limit) = filter.limit {
            query.push(" LIMIT ").push_bind(limit);
        }

        let projects = query.build_query_as::<Project>().fetch_all(&mut *self.db).await?;
        Ok(projects)
    }

    #[instrument(skip(self), fields(project_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: ProjectId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(project_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: ProjectId, request: &ProjectFields) -> Result<Self::Row> {
        let sql = format!(
            r#"
            UPDATE projects SET
                title = $2, slug = $3, description = $4, problem = $5, solution = $6,
                category = $7, industry = $8, image_url = $9,
                stack_frontend = $10, stack_backend = $11, stack_database = $12, stack_tools = $13,
                results = $14, is_featured = $15, display_order = $16,
                testimonial_quote = $17, testimonial_author = $18, testimonial_role = $19,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PROJECT_COLUMNS}
            "#
        );

        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .bind(&request.title)
            .bind(&request.slug)
            .bind(&request.description)
            .bind(&request.problem)
            .bind(&request.solution)
            .bind(&request.category)
            .bind(&request.industry)
            .bind(&request.image_url)
            .bind(&request.stack_frontend)
            .bind(&request.stack_backend)
            .bind(&request.stack_database)
            .bind(&request.stack_tools)
            .bind(&request.results)
            .bind(request.is_featured)
            .bind(request.display_order)
            .bind(&request.testimonial_quote)
            .bind(&request.testimonial_author)
            .bind(&request.testimonial_role)
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;

        Ok(project)
    }

    #[instrument(skip(self), err)]
    async fn count(&mut self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM projects")
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count)
    }
}
