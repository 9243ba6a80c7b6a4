//! Project edit dialog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::admin::{
    crud::{Editable, Listed},
    draft::{join_lines, join_list, none_if_empty, or_empty, split_lines, split_list},
    slug::slug_or_derive,
};
use crate::db::models::projects::{Project, ProjectFields};
use crate::forms::validation::FieldError;

/// Text fields of the project dialog. Stack fields are comma separated, results one per line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ProjectDraft {
    pub title: String,
    /// Derived from the title when left empty
    pub slug: String,
    pub description: String,
    pub problem: String,
    pub solution: String,
    pub category: String,
    pub industry: String,
    pub image_url: String,
    pub stack_frontend: String,
    pub stack_backend: String,
    pub stack_database: String,
    pub stack_tools: String,
    pub results: String,
    pub is_featured: bool,
    pub display_order: i32,
    pub testimonial_quote: String,
    pub testimonial_author: String,
    pub testimonial_role: String,
}

impl Listed for Project {
    const LABEL: &'static str = "Project";
    const PLURAL: &'static str = "projects";
}

impl Editable for Project {
    type Draft = ProjectDraft;

    fn to_draft(&self) -> ProjectDraft {
        ProjectDraft {
            title: self.title.clone(),
            slug: self.slug.clone(),
            description: or_empty(&self.description),
            problem: or_empty(&self.problem),
            solution: or_empty(&self.solution),
            category: or_empty(&self.category),
            industry: or_empty(&self.industry),
            image_url: or_empty(&self.image_url),
            stack_frontend: join_list(&self.stack_frontend),
            stack_backend: join_list(&self.stack_backend),
            stack_database: join_list(&self.stack_database),
            stack_tools: join_list(&self.stack_tools),
            results: join_lines(&self.results),
            is_featured: self.is_featured,
            display_order: self.display_order,
            testimonial_quote: or_empty(&self.testimonial_quote),
            testimonial_author: or_empty(&self.testimonial_author),
            testimonial_role: or_empty(&self.testimonial_role),
        }
    }

    fn from_draft(draft: &ProjectDraft, _editing: Option<&Self>, _now: DateTime<Utc>) -> Result<ProjectFields, Vec<FieldError>> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(vec![FieldError::new("title", "Title is required")]);
        }

        Ok(ProjectFields {
            title: title.to_string(),
            slug: slug_or_derive(&draft.slug, title),
            description: none_if_empty(&draft.description),
            problem: none_if_empty(&draft.problem),
            solution: none_if_empty(&draft.solution),
            category: none_if_empty(&draft.category),
            industry: none_if_empty(&draft.industry),
            image_url: none_if_empty(&draft.image_url),
            stack_frontend: split_list(&draft.stack_frontend),
            stack_backend: split_list(&draft.stack_backend),
            stack_database: split_list(&draft.stack_database),
            stack_tools: split_list(&draft.stack_tools),
            results: split_lines(&draft.results),
            is_featured: draft.is_featured,
            display_order: draft.display_order,
            testimonial_quote: none_if_empty(&draft.testimonial_quote),
            testimonial_author: none_if_empty(&draft.testimonial_author),
            testimonial_role: none_if_empty(&draft.testimonial_role),
        })
    }

    fn into_update(fields: ProjectFields) -> ProjectFields {
        fields
    }
}
