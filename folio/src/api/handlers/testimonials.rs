//! Admin endpoints for testimonials.

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::{
    AppState,
    admin::testimonials::TestimonialDraft,
    api::{
        handlers::editable,
        models::admin::{AdminErrorBody, AdminFailure, AdminResponse, AdminResult, DeleteQuery, WithStatus},
    },
    auth::current_user::RequireAdmin,
    db::models::testimonials::Testimonial,
    types::TestimonialId,
};

/// List testimonials in display order
#[utoipa::path(
    get,
    path = "/testimonials",
    tag = "admin",
    responses(
        (status = 200, description = "Testimonials", body = AdminResponse<Vec<Testimonial>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 500, description = "Testimonials could not be loaded", body = AdminErrorBody),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_testimonials(State(state): State<AppState>, _: RequireAdmin) -> AdminResult<Vec<Testimonial>> {
    editable::list::<Testimonial>(&state.stores).await
}

/// An empty draft for the create dialog
#[utoipa::path(
    get,
    path = "/testimonials/draft",
    tag = "admin",
    responses((status = 200, description = "Blank draft", body = AdminResponse<TestimonialDraft>)),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn new_testimonial_draft(State(state): State<AppState>, _: RequireAdmin) -> AdminResponse<TestimonialDraft> {
    editable::blank_draft::<Testimonial>(&state.stores)
}

/// A draft pre-populated from an existing testimonial
#[utoipa::path(
    get,
    path = "/testimonials/{id}/draft",
    tag = "admin",
    params(("id" = uuid::Uuid, Path, description = "Testimonial ID")),
    responses(
        (status = 200, description = "Draft for the edit dialog", body = AdminResponse<TestimonialDraft>),
        (status = 404, description = "Testimonial not found", body = AdminErrorBody),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip(state, _admin))]
pub async fn edit_testimonial_draft(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<TestimonialId>,
) -> AdminResult<TestimonialDraft> {
    editable::edit_draft::<Testimonial>(&state.stores, id).await
}

/// Create a testimonial
#[utoipa::path(
    post,
    path = "/testimonials",
    tag = "admin",
    request_body = TestimonialDraft,
    responses(
        (status = 201, description = "Testimonial created", body = AdminResponse<Testimonial>),
        (status = 422, description = "Invalid draft", body = AdminErrorBody),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_testimonial(
    State(state): State<AppState>,
    _: RequireAdmin,
    Json(draft): Json<TestimonialDraft>,
) -> Result<WithStatus<Testimonial>, AdminFailure> {
    editable::create::<Testimonial>(&state.stores, draft).await
}

/// Replace a testimonial with the contents of a draft
#[utoipa::path(
    put,
    path = "/testimonials/{id}",
    tag = "admin",
    request_body = TestimonialDraft,
    params(("id" = uuid::Uuid, Path, description = "Testimonial ID")),
    responses(
        (status = 200, description = "Testimonial updated", body = AdminResponse<Testimonial>),
        (status = 404, description = "Testimonial not found", body = AdminErrorBody),
        (status = 422, description = "Invalid draft", body = AdminErrorBody),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip(state, _admin, draft))]
pub async fn update_testimonial(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<TestimonialId>,
    Json(draft): Json<TestimonialDraft>,
) -> AdminResult<Testimonial> {
    editable::update::<Testimonial>(&state.stores, id, draft).await
}

/// Delete a testimonial. Requires `confirm=true`.
#[utoipa::path(
    delete,
    path = "/testimonials/{id}",
    tag = "admin",
    params(("id" = uuid::Uuid, Path, description = "Testimonial ID"), DeleteQuery),
    responses(
        (status = 200, description = "Testimonial deleted"),
        (status = 400, description = "Deletion not confirmed", body = AdminErrorBody),
        (status = 404, description = "Testimonial not found", body = AdminErrorBody),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip(state, _admin))]
pub async fn delete_testimonial(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<TestimonialId>,
    Query(query): Query<DeleteQuery>,
) -> AdminResult<()> {
    editable::remove::<Testimonial>(&state.stores, id, query.confirm).await
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{admin_cookie, create_test_app};
    use axum::http::{StatusCode, header};
    use serde_json::{Value, json};

    #[tokio::test]
    async fn test_invalid_testimonial_lists_every_problem() {
        let (server, state) = create_test_app().await;
        let cookie = admin_cookie(&state).await;

        let response = server
            .post("/admin/api/v1/testimonials")
            .add_header(header::COOKIE, cookie)
            .json(&json!({"quote": "", "author_name": "", "rating": 9}))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = response.json();
        let fields: Vec<&str> = body["field_errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["quote", "author_name", "rating"]);
        assert_eq!(state.stores.testimonials.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_and_list_in_display_order() {
        let (server, state) = create_test_app().await;
        let cookie = admin_cookie(&state).await;

        for (author, order) in [("Second", 2), ("First", 1)] {
            let response = server
                .post("/admin/api/v1/testimonials")
                .add_header(header::COOKIE, cookie.clone())
                .json(&json!({"quote": "Great work", "author_name": author, "display_order": order}))
                .await;
            response.assert_status(StatusCode::CREATED);
            assert_eq!(response.json::<Value>()["data"]["rating"], 5);
        }

        let body: Value = server
            .get("/admin/api/v1/testimonials")
            .add_header(header::COOKIE, cookie)
            .await
            .json();
        let authors: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["author_name"].as_str().unwrap())
            .collect();
        assert_eq!(authors, vec!["First", "Second"]);
    }
}
