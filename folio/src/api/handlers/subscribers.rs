//! Admin view of the mailing list.

use axum::extract::State;

use crate::{
    AppState,
    api::models::admin::{AdminErrorBody, AdminFailure, AdminResponse, AdminResult},
    auth::current_user::RequireAdmin,
    db::{models::subscribers::Subscriber, persistence::ListQuery},
    notifications::{Notification, NotificationBuffer, Notifier},
};

/// List newsletter subscribers, most recent first
#[utoipa::path(
    get,
    path = "/subscribers",
    tag = "admin",
    responses(
        (status = 200, description = "Subscribers", body = AdminResponse<Vec<Subscriber>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 500, description = "Subscribers could not be loaded", body = AdminErrorBody),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_subscribers(State(state): State<AppState>, _: RequireAdmin) -> AdminResult<Vec<Subscriber>> {
    let notifications = NotificationBuffer::new();

    match state.stores.subscribers.list(&ListQuery::default().newest_first()).await {
        Ok(subscribers) => Ok(AdminResponse::new(subscribers, &notifications)),
        Err(err) => {
            notifications.notify(Notification::error("Error loading subscribers"));
            Err(AdminFailure::new(err, &notifications))
        }
    }
}
