//! Database models for portfolio projects.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::persistence::{Persistence, Record, Stores};
use crate::types::ProjectId;

/// A case study shown on the portfolio pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Project {
    #[schema(value_type = String, format = "uuid")]
    pub id: ProjectId,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub problem: Option<String>,
    pub solution: Option<String>,
    pub category: Option<String>,
    pub industry: Option<String>,
    pub image_url: Option<String>,
    pub stack_frontend: Vec<String>,
    pub stack_backend: Vec<String>,
    pub stack_database: Vec<String>,
    pub stack_tools: Vec<String>,
    pub results: Vec<String>,
    pub is_featured: bool,
    pub display_order: i32,
    pub testimonial_quote: Option<String>,
    pub testimonial_author: Option<String>,
    pub testimonial_role: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable columns of a project. Used for both inserts and updates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProjectFields {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub problem: Option<String>,
    pub solution: Option<String>,
    pub category: Option<String>,
    pub industry: Option<String>,
    pub image_url: Option<String>,
    pub stack_frontend: Vec<String>,
    pub stack_backend: Vec<String>,
    pub stack_database: Vec<String>,
    pub stack_tools: Vec<String>,
    pub results: Vec<String>,
    pub is_featured: bool,
    pub display_order: i32,
    pub testimonial_quote: Option<String>,
    pub testimonial_author: Option<String>,
    pub testimonial_role: Option<String>,
}

impl From<&Project> for ProjectFields {
    fn from(project: &Project) -> Self {
        Self {
            title: project.title.clone(),
            slug: project.slug.clone(),
            description: project.description.clone(),
            problem: project.problem.clone(),
            solution: project.solution.clone(),
            category: project.category.clone(),
            industry: project.industry.clone(),
            image_url: project.image_url.clone(),
            stack_frontend: project.stack_frontend.clone(),
            stack_backend: project.stack_backend.clone(),
            stack_database: project.stack_database.clone(),
            stack_tools: project.stack_tools.clone(),
            results: project.results.clone(),
            is_featured: project.is_featured,
            display_order: project.display_order,
            testimonial_quote: project.testimonial_quote.clone(),
            testimonial_author: project.testimonial_author.clone(),
            testimonial_role: project.testimonial_role.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub featured: Option<bool>,
    pub slug: Option<String>,
}

impl Record for Project {
    type Create = ProjectFields;
    type Update = ProjectFields;
    type Filter = ProjectFilter;

    const TABLE: &'static str = "projects";

    fn id(&self) -> Uuid {
        self.id
    }

    fn store(stores: &Stores) -> &Arc<dyn Persistence<Self>> {
        &stores.projects
    }
}
