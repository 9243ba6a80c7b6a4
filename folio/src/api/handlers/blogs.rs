//! Admin endpoints for blog posts.

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::{
    AppState,
    admin::blogs::BlogDraft,
    api::{
        handlers::editable,
        models::admin::{AdminErrorBody, AdminFailure, AdminResponse, AdminResult, DeleteQuery, WithStatus},
    },
    auth::current_user::RequireAdmin,
    db::models::blogs::BlogPost,
    types::BlogId,
};

/// List all posts, drafts included, newest first
#[utoipa::path(
    get,
    path = "/blogs",
    tag = "admin",
    responses(
        (status = 200, description = "Posts", body = AdminResponse<Vec<BlogPost>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 500, description = "Posts could not be loaded", body = AdminErrorBody),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_blogs(State(state): State<AppState>, _: RequireAdmin) -> AdminResult<Vec<BlogPost>> {
    editable::list::<BlogPost>(&state.stores).await
}

/// An empty draft for the create dialog
#[utoipa::path(
    get,
    path = "/blogs/draft",
    tag = "admin",
    responses((status = 200, description = "Blank draft", body = AdminResponse<BlogDraft>)),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn new_blog_draft(State(state): State<AppState>, _: RequireAdmin) -> AdminResponse<BlogDraft> {
    editable::blank_draft::<BlogPost>(&state.stores)
}

/// A draft pre-populated from an existing post
#[utoipa::path(
    get,
    path = "/blogs/{id}/draft",
    tag = "admin",
    params(("id" = uuid::Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Draft for the edit dialog", body = AdminResponse<BlogDraft>),
        (status = 404, description = "Post not found", body = AdminErrorBody),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip(state, _admin))]
pub async fn edit_blog_draft(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<BlogId>,
) -> AdminResult<BlogDraft> {
    editable::edit_draft::<BlogPost>(&state.stores, id).await
}

/// Create a post. The slug is derived from the title when left empty.
#[utoipa::path(
    post,
    path = "/blogs",
    tag = "admin",
    request_body = BlogDraft,
    responses(
        (status = 201, description = "Post created", body = AdminResponse<BlogPost>),
        (status = 409, description = "Slug already in use", body = AdminErrorBody),
        (status = 422, description = "Invalid draft", body = AdminErrorBody),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_blog(
    State(state): State<AppState>,
    _: RequireAdmin,
    Json(draft): Json<BlogDraft>,
) -> Result<WithStatus<BlogPost>, AdminFailure> {
    editable::create::<BlogPost>(&state.stores, draft).await
}

/// Replace a post with the contents of a draft
#[utoipa::path(
    put,
    path = "/blogs/{id}",
    tag = "admin",
    request_body = BlogDraft,
    params(("id" = uuid::Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post updated", body = AdminResponse<BlogPost>),
        (status = 404, description = "Post not found", body = AdminErrorBody),
        (status = 409, description = "Slug already in use", body = AdminErrorBody),
        (status = 422, description = "Invalid draft", body = AdminErrorBody),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip(state, _admin, draft))]
pub async fn update_blog(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<BlogId>,
    Json(draft): Json<BlogDraft>,
) -> AdminResult<BlogPost> {
    editable::update::<BlogPost>(&state.stores, id, draft).await
}

/// Delete a post. Requires `confirm=true`.
#[utoipa::path(
    delete,
    path = "/blogs/{id}",
    tag = "admin",
    params(("id" = uuid::Uuid, Path, description = "Post ID"), DeleteQuery),
    responses(
        (status = 200, description = "Post deleted"),
        (status = 400, description = "Deletion not confirmed", body = AdminErrorBody),
        (status = 404, description = "Post not found", body = AdminErrorBody),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip(state, _admin))]
pub async fn delete_blog(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<BlogId>,
    Query(query): Query<DeleteQuery>,
) -> AdminResult<()> {
    editable::remove::<BlogPost>(&state.stores, id, query.confirm).await
}

/// Publish or unpublish a post. `published_at` is set the first time a post is published.
#[utoipa::path(
    post,
    path = "/blogs/{id}/toggle-publish",
    tag = "admin",
    params(("id" = uuid::Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post with its new published flag", body = AdminResponse<BlogPost>),
        (status = 404, description = "Post not found", body = AdminErrorBody),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip(state, _admin))]
pub async fn toggle_blog_publish(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<BlogId>,
) -> AdminResult<BlogPost> {
    editable::toggle_publish::<BlogPost>(&state.stores, id).await
}
