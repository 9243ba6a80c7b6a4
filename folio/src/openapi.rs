//! OpenAPI documentation, served at `/admin/docs`.
//!
//! The admin handlers declare paths relative to `/admin/api/v1`, so they live in [`AdminApi`] and
//! are nested into [`ApiDoc`] under that prefix. The public handlers are nested under `/api/v1`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

use crate::{admin, api, db, forms, notifications};

/// Security scheme for the admin API (session cookie set by `/authentication/login`).
struct CookieAuthAddon;

impl Modify for CookieAuthAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.security_schemes.insert(
            "CookieAuth".to_string(),
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "folio_session",
                "Session cookie issued by `POST /authentication/login`. The cookie name follows `auth.session.cookie_name`.",
            ))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(paths(
    api::handlers::forms::submit_contact,
    api::handlers::forms::reset_contact,
    api::handlers::forms::subscribe_newsletter,
    api::handlers::content::list_projects,
    api::handlers::content::get_project,
    api::handlers::content::featured_testimonials,
    api::handlers::content::list_blogs,
    api::handlers::content::get_blog,
))]
pub struct PublicApi;

#[derive(OpenApi)]
#[openapi(paths(
    api::handlers::projects::list_projects,
    api::handlers::projects::new_project_draft,
    api::handlers::projects::edit_project_draft,
    api::handlers::projects::create_project,
    api::handlers::projects::update_project,
    api::handlers::projects::delete_project,
    api::handlers::testimonials::list_testimonials,
    api::handlers::testimonials::new_testimonial_draft,
    api::handlers::testimonials::edit_testimonial_draft,
    api::handlers::testimonials::create_testimonial,
    api::handlers::testimonials::update_testimonial,
    api::handlers::testimonials::delete_testimonial,
    api::handlers::blogs::list_blogs,
    api::handlers::blogs::new_blog_draft,
    api::handlers::blogs::edit_blog_draft,
    api::handlers::blogs::create_blog,
    api::handlers::blogs::update_blog,
    api::handlers::blogs::delete_blog,
    api::handlers::blogs::toggle_blog_publish,
    api::handlers::inquiries::list_inquiries,
    api::handlers::inquiries::update_inquiry_status,
    api::handlers::inquiries::delete_inquiry,
    api::handlers::subscribers::list_subscribers,
    api::handlers::dashboard::get_dashboard,
))]
pub struct AdminApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::auth::login,
        api::handlers::auth::logout,
        api::handlers::auth::me,
    ),
    nest(
        (path = "/api/v1", api = PublicApi),
        (path = "/admin/api/v1", api = AdminApi),
    ),
    components(schemas(
        api::models::auth::LoginRequest,
        api::models::auth::AuthResponse,
        api::models::auth::AuthSuccessResponse,
        api::models::users::CurrentUser,
        api::models::users::UserResponse,
        api::models::submissions::ContactRequest,
        api::models::submissions::NewsletterRequest,
        api::models::submissions::SubmissionResponse,
        api::models::admin::AdminErrorBody,
        api::models::admin::InquiryStatusUpdate,
        forms::controller::FormState,
        forms::validation::FieldError,
        notifications::Notification,
        admin::projects::ProjectDraft,
        admin::testimonials::TestimonialDraft,
        admin::blogs::BlogDraft,
        admin::dashboard::DashboardStats,
        db::models::projects::Project,
        db::models::testimonials::Testimonial,
        db::models::blogs::BlogPost,
        db::models::inquiries::ContactInquiry,
        db::models::inquiries::InquiryStatus,
        db::models::subscribers::Subscriber,
        db::models::users::Role,
    )),
    modifiers(&CookieAuthAddon),
    tags(
        (name = "forms", description = "Public contact and newsletter forms. Each visitor has a 60 second cooldown after a successful submission."),
        (name = "content", description = "Published projects, featured testimonials and blog posts"),
        (name = "authentication", description = "Admin sign in with email and password"),
        (name = "admin", description = "Content editing, inquiry triage and the mailing list. Requires an admin session."),
    ),
    info(
        title = "Folio API",
        version = "1.0.0",
        description = "Back office for a portfolio site.

## Notifications

Admin responses carry a `notifications` array describing what happened, e.g. `Project created` or `Error saving project`. Failed admin calls return the same array alongside `message` and `field_errors`.",
    ),
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_nested_under_their_prefix() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        assert!(paths.iter().any(|p| p.as_str() == "/api/v1/contact"));
        assert!(paths.iter().any(|p| p.as_str() == "/api/v1/projects/{slug}"));
        assert!(paths.iter().any(|p| p.as_str() == "/admin/api/v1/projects/{id}"));
        assert!(paths.iter().any(|p| p.as_str() == "/authentication/login"));
        assert!(!paths.iter().any(|p| p.as_str() == "/projects"));
    }

    #[test]
    fn test_cookie_auth_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("CookieAuth"));
        assert!(components.schemas.contains_key("SubmissionResponse"));
    }
}
