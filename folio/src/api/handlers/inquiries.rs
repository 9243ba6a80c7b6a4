//! Admin endpoints for contact form inquiries.

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::{
    AppState,
    admin::inquiries::InquiryDesk,
    api::models::admin::{AdminErrorBody, AdminFailure, AdminResponse, AdminResult, DeleteQuery, InquiryStatusUpdate},
    auth::current_user::RequireAdmin,
    db::models::inquiries::ContactInquiry,
    notifications::NotificationBuffer,
    types::InquiryId,
};

/// List inquiries, newest first
#[utoipa::path(
    get,
    path = "/inquiries",
    tag = "admin",
    responses(
        (status = 200, description = "Inquiries", body = AdminResponse<Vec<ContactInquiry>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 500, description = "Inquiries could not be loaded", body = AdminErrorBody),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_inquiries(State(state): State<AppState>, _: RequireAdmin) -> AdminResult<Vec<ContactInquiry>> {
    let notifications = NotificationBuffer::new();
    let mut desk = InquiryDesk::from_stores(&state.stores);

    match desk.refresh(&notifications).await {
        Ok(inquiries) => {
            let inquiries = inquiries.to_vec();
            Ok(AdminResponse::new(inquiries, &notifications))
        }
        Err(err) => Err(AdminFailure::new(err, &notifications)),
    }
}

/// Move an inquiry to another status
#[utoipa::path(
    patch,
    path = "/inquiries/{id}",
    tag = "admin",
    request_body = InquiryStatusUpdate,
    params(("id" = uuid::Uuid, Path, description = "Inquiry ID")),
    responses(
        (status = 200, description = "Inquiry updated", body = AdminResponse<ContactInquiry>),
        (status = 404, description = "Inquiry not found", body = AdminErrorBody),
        (status = 422, description = "Unknown status", body = AdminErrorBody),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip(state, _admin, update))]
pub async fn update_inquiry_status(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<InquiryId>,
    Json(update): Json<InquiryStatusUpdate>,
) -> AdminResult<ContactInquiry> {
    let notifications = NotificationBuffer::new();
    let mut desk = InquiryDesk::from_stores(&state.stores);

    match desk.update_status(id, &update.status, &notifications).await {
        Ok(inquiry) => Ok(AdminResponse::new(inquiry, &notifications)),
        Err(err) => Err(AdminFailure::new(err, &notifications)),
    }
}

/// Delete an inquiry. Requires `confirm=true`.
#[utoipa::path(
    delete,
    path = "/inquiries/{id}",
    tag = "admin",
    params(("id" = uuid::Uuid, Path, description = "Inquiry ID"), DeleteQuery),
    responses(
        (status = 200, description = "Inquiry deleted"),
        (status = 400, description = "Deletion not confirmed", body = AdminErrorBody),
        (status = 404, description = "Inquiry not found", body = AdminErrorBody),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip(state, _admin))]
pub async fn delete_inquiry(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<InquiryId>,
    Query(query): Query<DeleteQuery>,
) -> AdminResult<()> {
    let notifications = NotificationBuffer::new();
    let mut desk = InquiryDesk::from_stores(&state.stores);

    match desk.remove(id, query.confirm, &notifications).await {
        Ok(()) => Ok(AdminResponse::new((), &notifications)),
        Err(err) => Err(AdminFailure::new(err, &notifications)),
    }
}
