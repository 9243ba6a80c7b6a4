//! # folio: back office for a portfolio site
//!
//! `folio` serves the dynamic parts of a portfolio website: the public contact and newsletter
//! forms, the published content the site renders (projects, featured testimonials, blog posts),
//! and an admin API for editing that content and triaging inquiries.
//!
//! ## Architecture
//!
//! The HTTP layer is [Axum](https://github.com/tokio-rs/axum). Records live in PostgreSQL through
//! sqlx, or in process memory when `database.type` is `memory`. Controllers never see either
//! directly: they are handed `Arc<dyn Persistence<R>>` adapters from [`db::persistence::Stores`].
//!
//! ### Public forms (`/api/v1/contact`, `/api/v1/newsletter`)
//!
//! Each visitor gets one [`forms::controller::SubmissionController`] per form, kept in a bounded
//! cache keyed by client address. A submission runs the bot trap, the 60 second cooldown,
//! field validation, exactly one persistence call, and a state transition. The response carries
//! the resulting form state and the notifications a UI would toast.
//!
//! ### Admin API (`/admin/api/v1/*`)
//!
//! Requests authenticate with a session cookie issued by `/authentication/login` and must carry
//! the admin role. Each request drives a fresh [`admin::crud::AdminCrud`] (or
//! [`admin::inquiries::InquiryDesk`]) and returns its notifications alongside the data.
//!
//! ## Quick Start
//!
//! ```no_run
//! use folio::{Application, Config, telemetry};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async { tokio::signal::ctrl_c().await.unwrap_or_default() }).await
//! }
//! ```
//!
//! ## Modules
//!
//! - [`forms`]: Public form pipeline and per-client registry
//! - [`admin`]: Back office controllers, slug derivation, draft helpers
//! - [`api`]: HTTP handlers and request/response models
//! - [`auth`]: Password hashing, session tokens, current user extraction
//! - [`db`]: Persistence adapters and Postgres repositories
//! - [`notifications`]: Toast events emitted by controllers
//! - [`config`]: YAML and environment configuration
//! - [`telemetry`]: Tracing and OpenTelemetry setup

pub mod admin;
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod forms;
pub mod notifications;
mod openapi;
pub mod telemetry;
pub mod types;

#[cfg(test)]
mod test_utils;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use auth::password::{self, Argon2Params};
use axum::{
    Json, Router,
    http::{HeaderName, HeaderValue},
    routing::{get, post, put},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
use config::{CorsOrigin, DatabaseConfig};
use db::persistence::Stores;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info, instrument, warn};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use config::Config;
pub use types::UserId;

use crate::{
    api::handlers::{auth as auth_handlers, blogs, content, dashboard, forms as form_handlers, inquiries, projects, subscribers, testimonials},
    forms::Forms,
    openapi::ApiDoc,
};

/// Shared state handed to every handler.
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config)
///     .stores(Stores::in_memory())
///     .forms(Arc::new(forms))
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    /// One persistence adapter per table
    pub stores: Stores,
    /// Per-client instances of the public forms
    pub forms: Arc<Forms>,
}

/// Get the folio database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Ensure the configured admin account exists.
///
/// Idempotent: an existing account keeps its id and gains the admin role. When `password` is
/// given it replaces the stored hash, otherwise the stored password is left alone.
#[instrument(skip_all, fields(email = %email))]
pub async fn create_initial_admin_user(email: &str, password: Option<&str>, params: Argon2Params, stores: &Stores) -> anyhow::Result<UserId> {
    let password_hash = match password {
        Some(pwd) => Some(password::hash_password(pwd, params).context("hash admin password")?),
        None => None,
    };

    let user_id = stores
        .accounts
        .ensure_admin(email, password_hash)
        .await
        .context("ensure admin account")?;

    info!(user_id = %user_id, "admin account ready");
    Ok(user_id)
}

/// Connect to the configured database and run migrations, or set up in-memory stores.
///
/// Returns the pool alongside the stores so it can be closed on shutdown.
#[instrument(skip_all)]
pub async fn setup_database(config: &Config) -> anyhow::Result<(Stores, Option<PgPool>)> {
    match &config.database {
        DatabaseConfig::Memory => {
            warn!("Using in-memory storage, all records are lost on restart");
            Ok((Stores::in_memory(), None))
        }
        DatabaseConfig::External { url, pool } => {
            let mut options = PgPoolOptions::new()
                .max_connections(pool.max_connections)
                .min_connections(pool.min_connections)
                .acquire_timeout(Duration::from_secs(pool.acquire_timeout_secs));

            if pool.idle_timeout_secs > 0 {
                options = options.idle_timeout(Duration::from_secs(pool.idle_timeout_secs));
            }
            if pool.max_lifetime_secs > 0 {
                options = options.max_lifetime(Duration::from_secs(pool.max_lifetime_secs));
            }

            let db = options.connect(url).await.context("connect to database")?;
            migrator().run(&db).await.context("run database migrations")?;
            info!("Database connected and migrated");

            Ok((Stores::postgres(db.clone()), Some(db)))
        }
    }
}

/// Build the CORS layer from `auth.security.cors`.
///
/// Origins are compared against the browser's `Origin` header, which never has a path, so URLs
/// are reduced to their origin.
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.auth.security.cors;

    // tower-http rejects `*` inside an origin list, so a wildcard replaces the whole list
    let allow_origin = if cors_config.allowed_origins.iter().any(|o| matches!(o, CorsOrigin::Wildcard)) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &cors_config.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.origin().ascii_serialization().parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let exposed = cors_config
        .exposed_headers
        .iter()
        .map(|name| name.parse::<HeaderName>())
        .collect::<Result<Vec<_>, _>>()
        .context("parse exposed CORS header")?;

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_credentials(cors_config.allow_credentials)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::PATCH,
            axum::http::Method::DELETE,
        ])
        .allow_headers([axum::http::header::CONTENT_TYPE])
        .expose_headers(exposed);

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router.
///
/// - `/healthz`
/// - `/authentication/*`: login, logout, current session
/// - `/api/v1/*`: public forms and published content
/// - `/admin/api/v1/*`: admin content editing, inquiries, subscribers, dashboard
/// - `/admin/docs`: API reference
/// - `/internal/metrics`: Prometheus exposition, when `enable_metrics` is set
///
/// CORS is only applied when origins are configured; otherwise the API is same-origin.
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let auth_routes = Router::new()
        .route("/authentication/login", post(auth_handlers::login))
        .route("/authentication/logout", post(auth_handlers::logout))
        .route("/authentication/me", get(auth_handlers::me));

    let public_routes = Router::new()
        .route("/contact", post(form_handlers::submit_contact))
        .route("/contact/reset", post(form_handlers::reset_contact))
        .route("/newsletter", post(form_handlers::subscribe_newsletter))
        .route("/projects", get(content::list_projects))
        .route("/projects/{slug}", get(content::get_project))
        .route("/testimonials/featured", get(content::featured_testimonials))
        .route("/blogs", get(content::list_blogs))
        .route("/blogs/{slug}", get(content::get_blog));

    let admin_routes = Router::new()
        .route("/dashboard", get(dashboard::get_dashboard))
        // Projects
        .route("/projects", get(projects::list_projects).post(projects::create_project))
        .route("/projects/draft", get(projects::new_project_draft))
        .route("/projects/{id}", put(projects::update_project).delete(projects::delete_project))
        .route("/projects/{id}/draft", get(projects::edit_project_draft))
        // Testimonials
        .route(
            "/testimonials",
            get(testimonials::list_testimonials).post(testimonials::create_testimonial),
        )
        .route("/testimonials/draft", get(testimonials::new_testimonial_draft))
        .route(
            "/testimonials/{id}",
            put(testimonials::update_testimonial).delete(testimonials::delete_testimonial),
        )
        .route("/testimonials/{id}/draft", get(testimonials::edit_testimonial_draft))
        // Blog posts
        .route("/blogs", get(blogs::list_blogs).post(blogs::create_blog))
        .route("/blogs/draft", get(blogs::new_blog_draft))
        .route("/blogs/{id}", put(blogs::update_blog).delete(blogs::delete_blog))
        .route("/blogs/{id}/draft", get(blogs::edit_blog_draft))
        .route("/blogs/{id}/toggle-publish", post(blogs::toggle_blog_publish))
        // Inquiries and subscribers
        .route("/inquiries", get(inquiries::list_inquiries))
        .route(
            "/inquiries/{id}",
            axum::routing::patch(inquiries::update_inquiry_status).delete(inquiries::delete_inquiry),
        )
        .route("/subscribers", get(subscribers::list_subscribers));

    let mut router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .merge(auth_routes)
        .nest("/api/v1", public_routes)
        .nest("/admin/api/v1", admin_routes)
        .with_state(state.clone())
        .route("/admin/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(Scalar::with_url("/admin/docs", ApiDoc::openapi()));

    if !state.config.auth.security.cors.allowed_origins.is_empty() {
        router = router.layer(create_cors_layer(&state.config)?);
    }

    if state.config.enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// The assembled service: state, router, and the resources to release on shutdown.
pub struct Application {
    router: Router,
    app_state: AppState,
    config: Config,
    pool: Option<PgPool>,
}

impl Application {
    /// Connect storage, ensure the admin account, and build the router.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let (stores, pool) = setup_database(&config).await?;

        create_initial_admin_user(
            &config.admin_email,
            config.admin_password.as_deref(),
            Argon2Params::from(&config.auth.password),
            &stores,
        )
        .await?;

        let forms = Arc::new(Forms::new(&stores, &config.forms));
        let app_state = AppState::builder().config(config.clone()).stores(stores).forms(forms).build();
        let router = build_router(&app_state)?;

        Ok(Self {
            router,
            app_state,
            config,
            pool,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.app_state
    }

    #[cfg(test)]
    pub fn into_test_server(self) -> (axum_test::TestServer, AppState) {
        let server = axum_test::TestServer::new(self.router).expect("Failed to create test server");
        (server, self.app_state)
    }

    /// Serve until `shutdown` resolves, then close the pool and flush telemetry.
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr)
            .await
            .with_context(|| format!("bind {bind_addr}"))?;
        info!("folio listening on http://{}", bind_addr);

        axum::serve(listener, self.router.into_make_service_with_connect_info::<SocketAddr>())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Shutting down");
        if let Some(pool) = self.pool {
            pool.close().await;
        }
        telemetry::shutdown_telemetry();

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::{TEST_ADMIN_EMAIL, create_test_app, create_test_config};
    use axum::http::{StatusCode, header};
    use url::Url;

    fn fast_params() -> Argon2Params {
        Argon2Params {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        }
    }

    #[tokio::test]
    async fn test_healthz() {
        let (server, _) = create_test_app().await;
        let response = server.get("/healthz").await;
        response.assert_status_ok();
        assert_eq!(response.text(), "OK");
    }

    #[tokio::test]
    async fn test_docs_are_served() {
        let (server, _) = create_test_app().await;
        server.get("/admin/docs").await.assert_status_ok();

        let spec: serde_json::Value = server.get("/admin/api-docs/openapi.json").await.json();
        assert_eq!(spec["info"]["title"], "Folio API");
    }

    #[tokio::test]
    async fn test_metrics_route_absent_when_disabled() {
        let (server, _) = create_test_app().await;
        server.get("/internal/metrics").await.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_initial_admin_user_is_idempotent() {
        let stores = Stores::in_memory();

        let first = create_initial_admin_user("owner@example.com", Some("first-password"), fast_params(), &stores)
            .await
            .unwrap();
        let second = create_initial_admin_user("owner@example.com", Some("second-password"), fast_params(), &stores)
            .await
            .unwrap();
        assert_eq!(first, second);

        let account = stores.accounts.find_by_email("owner@example.com").await.unwrap().unwrap();
        assert!(account.is_admin());
        let hash = account.password_hash.unwrap();
        assert!(password::verify_password("second-password", &hash).unwrap());

        // No password keeps the stored one
        create_initial_admin_user("owner@example.com", None, fast_params(), &stores)
            .await
            .unwrap();
        let account = stores.accounts.find_by_email("owner@example.com").await.unwrap().unwrap();
        assert!(password::verify_password("second-password", &account.password_hash.unwrap()).unwrap());
    }

    #[tokio::test]
    async fn test_application_with_memory_database() {
        let app = Application::new(create_test_config()).await.unwrap();
        let admin = app.state().stores.accounts.find_by_email(TEST_ADMIN_EMAIL).await.unwrap();
        assert!(admin.is_some());

        let (server, _) = app.into_test_server();
        server.get("/api/v1/projects").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        let mut config = create_test_config();
        config.auth.security.cors.allowed_origins = vec![CorsOrigin::Url(Url::parse("https://portfolio.example.com/").unwrap())];

        let (server, _) = Application::new(config).await.unwrap().into_test_server();
        let response = server
            .get("/api/v1/projects")
            .add_header(header::ORIGIN, "https://portfolio.example.com")
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://portfolio.example.com"
        );
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );
    }
}
