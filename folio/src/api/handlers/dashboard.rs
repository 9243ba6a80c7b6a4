use axum::extract::State;

use crate::{
    AppState,
    admin::dashboard::DashboardStats,
    api::models::admin::{AdminErrorBody, AdminFailure, AdminResponse, AdminResult},
    auth::current_user::RequireAdmin,
    notifications::NotificationBuffer,
};

/// Content counts for the admin landing page
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "admin",
    responses(
        (status = 200, description = "Counts per table", body = AdminResponse<DashboardStats>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 500, description = "Counts could not be loaded", body = AdminErrorBody),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_dashboard(State(state): State<AppState>, _: RequireAdmin) -> AdminResult<DashboardStats> {
    let notifications = NotificationBuffer::new();
    match DashboardStats::load(&state.stores).await {
        Ok(stats) => Ok(AdminResponse::new(stats, &notifications)),
        Err(err) => Err(AdminFailure::new(err, &notifications)),
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{admin_cookie, create_test_app};
    use axum::http::header;
    use serde_json::{Value, json};

    #[tokio::test]
    async fn test_dashboard_counts() {
        let (server, state) = create_test_app().await;
        let cookie = admin_cookie(&state).await;

        server
            .post("/admin/api/v1/projects")
            .add_header(header::COOKIE, cookie.clone())
            .json(&json!({"title": "Storefront"}))
            .await;

        let body: Value = server.get("/admin/api/v1/dashboard").add_header(header::COOKIE, cookie).await.json();
        assert_eq!(body["data"], json!({"projects": 1, "testimonials": 0, "blogs": 0, "inquiries": 0}));
    }
}
