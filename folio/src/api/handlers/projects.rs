//! Admin endpoints for portfolio projects.

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::{
    AppState,
    admin::projects::ProjectDraft,
    api::{
        handlers::editable,
        models::admin::{AdminErrorBody, AdminFailure, AdminResponse, AdminResult, DeleteQuery, WithStatus},
    },
    auth::current_user::RequireAdmin,
    db::models::projects::Project,
    types::ProjectId,
};

/// List projects in display order
#[utoipa::path(
    get,
    path = "/projects",
    tag = "admin",
    responses(
        (status = 200, description = "Projects", body = AdminResponse<Vec<Project>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 500, description = "Projects could not be loaded", body = AdminErrorBody),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_projects(State(state): State<AppState>, _: RequireAdmin) -> AdminResult<Vec<Project>> {
    editable::list::<Project>(&state.stores).await
}

/// An empty draft for the create dialog
#[utoipa::path(
    get,
    path = "/projects/draft",
    tag = "admin",
    responses((status = 200, description = "Blank draft", body = AdminResponse<ProjectDraft>)),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn new_project_draft(State(state): State<AppState>, _: RequireAdmin) -> AdminResponse<ProjectDraft> {
    editable::blank_draft::<Project>(&state.stores)
}

/// A draft pre-populated from an existing project
#[utoipa::path(
    get,
    path = "/projects/{id}/draft",
    tag = "admin",
    params(("id" = uuid::Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Draft for the edit dialog", body = AdminResponse<ProjectDraft>),
        (status = 404, description = "Project not found", body = AdminErrorBody),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip(state, _admin))]
pub async fn edit_project_draft(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<ProjectId>,
) -> AdminResult<ProjectDraft> {
    editable::edit_draft::<Project>(&state.stores, id).await
}

/// Create a project. The slug is derived from the title when left empty.
#[utoipa::path(
    post,
    path = "/projects",
    tag = "admin",
    request_body = ProjectDraft,
    responses(
        (status = 201, description = "Project created", body = AdminResponse<Project>),
        (status = 409, description = "Slug already in use", body = AdminErrorBody),
        (status = 422, description = "Invalid draft", body = AdminErrorBody),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_project(
    State(state): State<AppState>,
    _: RequireAdmin,
    Json(draft): Json<ProjectDraft>,
) -> Result<WithStatus<Project>, AdminFailure> {
    editable::create::<Project>(&state.stores, draft).await
}

/// Replace a project with the contents of a draft
#[utoipa::path(
    put,
    path = "/projects/{id}",
    tag = "admin",
    request_body = ProjectDraft,
    params(("id" = uuid::Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project updated", body = AdminResponse<Project>),
        (status = 404, description = "Project not found", body = AdminErrorBody),
        (status = 409, description = "Slug already in use", body = AdminErrorBody),
        (status = 422, description = "Invalid draft", body = AdminErrorBody),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip(state, _admin, draft))]
pub async fn update_project(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<ProjectId>,
    Json(draft): Json<ProjectDraft>,
) -> AdminResult<Project> {
    editable::update::<Project>(&state.stores, id, draft).await
}

/// Delete a project. Requires `confirm=true`.
#[utoipa::path(
    delete,
    path = "/projects/{id}",
    tag = "admin",
    params(("id" = uuid::Uuid, Path, description = "Project ID"), DeleteQuery),
    responses(
        (status = 200, description = "Project deleted"),
        (status = 400, description = "Deletion not confirmed", body = AdminErrorBody),
        (status = 404, description = "Project not found", body = AdminErrorBody),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip(state, _admin))]
pub async fn delete_project(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<ProjectId>,
    Query(query): Query<DeleteQuery>,
) -> AdminResult<()> {
    editable::remove::<Project>(&state.stores, id, query.confirm).await
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{admin_cookie, create_test_app};
    use axum::http::{StatusCode, header};
    use serde_json::{Value, json};

    #[tokio::test]
    async fn test_project_lifecycle() {
        let (server, state) = create_test_app().await;
        let cookie = admin_cookie(&state).await;

        let response = server
            .post("/admin/api/v1/projects")
            .add_header(header::COOKIE, cookie.clone())
            .json(&json!({"title": "My  Cool Project", "stack_frontend": "React, , TypeScript"}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["data"]["slug"], "my-cool-project");
        assert_eq!(body["data"]["stack_frontend"], json!(["React", "TypeScript"]));
        assert_eq!(body["notifications"][0]["title"], "Project created successfully");
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let draft: Value = server
            .get(&format!("/admin/api/v1/projects/{id}/draft"))
            .add_header(header::COOKIE, cookie.clone())
            .await
            .json();
        assert_eq!(draft["data"]["stack_frontend"], "React, TypeScript");

        let response = server
            .put(&format!("/admin/api/v1/projects/{id}"))
            .add_header(header::COOKIE, cookie.clone())
            .json(&json!({"title": "Renamed", "slug": "renamed"}))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["notifications"][0]["title"], "Project updated successfully");

        let response = server
            .delete(&format!("/admin/api/v1/projects/{id}"))
            .add_header(header::COOKIE, cookie.clone())
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(state.stores.projects.count().await.unwrap(), 1);

        let response = server
            .delete(&format!("/admin/api/v1/projects/{id}?confirm=true"))
            .add_header(header::COOKIE, cookie)
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["notifications"][0]["title"], "Project deleted");
        assert_eq!(state.stores.projects.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_a_friendly_conflict() {
        let (server, state) = create_test_app().await;
        let cookie = admin_cookie(&state).await;

        for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
            let response = server
                .post("/admin/api/v1/projects")
                .add_header(header::COOKIE, cookie.clone())
                .json(&json!({"title": "Same Name"}))
                .await;
            response.assert_status(expected);
        }

        let response = server
            .post("/admin/api/v1/projects")
            .add_header(header::COOKIE, cookie)
            .json(&json!({"title": "Same Name"}))
            .await;
        let body: Value = response.json();
        assert_eq!(body["message"], "A project with this slug already exists");
        assert_eq!(body["notifications"][0]["title"], "Error saving project");
    }

    #[tokio::test]
    async fn test_missing_title_is_rejected() {
        let (server, state) = create_test_app().await;
        let cookie = admin_cookie(&state).await;

        let response = server
            .post("/admin/api/v1/projects")
            .add_header(header::COOKIE, cookie)
            .json(&json!({"title": "   "}))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["field_errors"][0]["field"], "title");
        assert_eq!(body["notifications"], json!([]));
    }

    #[tokio::test]
    async fn test_admin_only() {
        let (server, state) = create_test_app().await;

        server.get("/admin/api/v1/projects").await.assert_status(StatusCode::UNAUTHORIZED);

        let cookie = crate::test_utils::user_cookie(&state);
        server
            .get("/admin/api/v1/projects")
            .add_header(header::COOKIE, cookie)
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_blank_draft() {
        let (server, state) = create_test_app().await;
        let cookie = admin_cookie(&state).await;

        let body: Value = server
            .get("/admin/api/v1/projects/draft")
            .add_header(header::COOKIE, cookie)
            .await
            .json();
        assert_eq!(body["data"]["title"], "");
        assert_eq!(body["data"]["is_featured"], false);
    }
}
