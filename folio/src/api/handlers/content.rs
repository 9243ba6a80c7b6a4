//! Read-only public content: projects, featured testimonials and published blog posts.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    AppState,
    db::{
        models::{
            blogs::{BlogFilter, BlogPost},
            projects::{Project, ProjectFilter},
            testimonials::{Testimonial, TestimonialFilter},
        },
        persistence::ListQuery,
    },
    errors::{Error, Result},
};

/// How many testimonials the home page shows
pub const FEATURED_TESTIMONIALS: i64 = 3;

/// List projects in display order
#[utoipa::path(
    get,
    path = "/projects",
    tag = "content",
    responses(
        (status = 200, description = "Projects in display order", body = Vec<Project>),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_projects(State(state): State<AppState>) -> Result<Json<Vec<Project>>> {
    Ok(Json(state.stores.projects.list(&ListQuery::default()).await?))
}

/// Get a project by slug
#[utoipa::path(
    get,
    path = "/projects/{slug}",
    tag = "content",
    params(("slug" = String, Path, description = "Project slug")),
    responses(
        (status = 200, description = "The project", body = Project),
        (status = 404, description = "No project with this slug"),
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_project(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Json<Project>> {
    let query = ListQuery::new(ProjectFilter {
        slug: Some(slug.clone()),
        ..Default::default()
    })
    .limit(1);

    let project = state.stores.projects.list(&query).await?.into_iter().next().ok_or(Error::NotFound {
        resource: "Project".to_string(),
        id: slug,
    })?;
    Ok(Json(project))
}

/// Testimonials for the home page
///
/// Featured testimonials in display order. When none are featured, the most recent ones instead.
#[utoipa::path(
    get,
    path = "/testimonials/featured",
    tag = "content",
    responses(
        (status = 200, description = "Up to three testimonials", body = Vec<Testimonial>),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn featured_testimonials(State(state): State<AppState>) -> Result<Json<Vec<Testimonial>>> {
    let featured = ListQuery::new(TestimonialFilter { featured: Some(true) }).limit(FEATURED_TESTIMONIALS);
    let testimonials = state.stores.testimonials.list(&featured).await?;
    if !testimonials.is_empty() {
        return Ok(Json(testimonials));
    }

    let recent = ListQuery::default().newest_first().limit(FEATURED_TESTIMONIALS);
    Ok(Json(state.stores.testimonials.list(&recent).await?))
}

/// List published blog posts, newest first
#[utoipa::path(
    get,
    path = "/blogs",
    tag = "content",
    responses(
        (status = 200, description = "Published posts", body = Vec<BlogPost>),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_blogs(State(state): State<AppState>) -> Result<Json<Vec<BlogPost>>> {
    let query = ListQuery::new(BlogFilter {
        published: Some(true),
        ..Default::default()
    })
    .newest_first();
    Ok(Json(state.stores.blogs.list(&query).await?))
}

/// Get a published blog post by slug
#[utoipa::path(
    get,
    path = "/blogs/{slug}",
    tag = "content",
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "The post", body = BlogPost),
        (status = 404, description = "No published post with this slug"),
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_blog(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Json<BlogPost>> {
    // Drafts are indistinguishable from missing posts
    let query = ListQuery::new(BlogFilter {
        published: Some(true),
        slug: Some(slug.clone()),
    })
    .limit(1);

    let post = state.stores.blogs.list(&query).await?.into_iter().next().ok_or(Error::NotFound {
        resource: "Blog post".to_string(),
        id: slug,
    })?;
    Ok(Json(post))
}
