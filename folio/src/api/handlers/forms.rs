//! Public contact and newsletter submissions.

use axum::{Json, extract::State};

use crate::{
    AppState,
    api::models::submissions::{ContactRequest, FormBody, NewsletterRequest, SubmissionReply, SubmissionResponse},
    forms::{
        controller::{FormDefinition, FormState},
        registry::{ClientKey, FormRegistry},
    },
    notifications::NotificationBuffer,
};

async fn submit<F: FormDefinition>(registry: &FormRegistry<F>, key: &ClientKey, body: FormBody) -> SubmissionReply {
    let controller = registry.instance(key).await;
    let notifications = NotificationBuffer::new();

    let outcome = controller.submit(&body.into_raw(), &notifications).await;

    SubmissionReply {
        state: outcome.state(),
        outcome,
        notifications: notifications.drain(),
    }
}

/// Send a project inquiry
#[utoipa::path(
    post,
    path = "/contact",
    tag = "forms",
    request_body = ContactRequest,
    responses(
        (status = 201, description = "Inquiry received", body = SubmissionResponse),
        (status = 409, description = "A submission from this client is still in progress", body = SubmissionResponse),
        (status = 422, description = "Invalid fields", body = SubmissionResponse),
        (status = 429, description = "Submitted too recently", body = SubmissionResponse,
            headers(("Retry-After" = u64, description = "Seconds until the next submission is accepted"))),
        (status = 500, description = "Inquiry could not be saved", body = SubmissionResponse),
        (status = 503, description = "Saving the inquiry timed out", body = SubmissionResponse),
    )
)]
#[tracing::instrument(skip_all, fields(client = %key))]
pub async fn submit_contact(State(state): State<AppState>, key: ClientKey, Json(body): Json<FormBody>) -> SubmissionReply {
    submit(&state.forms.contact, &key, body).await
}

/// Put the caller's contact form back to idle, e.g. for "send another message"
#[utoipa::path(
    post,
    path = "/contact/reset",
    tag = "forms",
    responses(
        (status = 200, description = "Form state after the reset", body = SubmissionResponse),
    )
)]
#[tracing::instrument(skip_all, fields(client = %key))]
pub async fn reset_contact(State(state): State<AppState>, key: ClientKey) -> Json<SubmissionResponse> {
    let form_state = match state.forms.contact.existing(&key).await {
        Some(controller) => controller.reset(),
        None => FormState::Idle,
    };

    Json(SubmissionResponse {
        state: form_state,
        message: None,
        field_errors: Vec::new(),
        retry_after_seconds: None,
        notifications: Vec::new(),
    })
}

/// Join the mailing list
#[utoipa::path(
    post,
    path = "/newsletter",
    tag = "forms",
    request_body = NewsletterRequest,
    responses(
        (status = 201, description = "Subscribed", body = SubmissionResponse),
        (status = 200, description = "Already subscribed", body = SubmissionResponse),
        (status = 409, description = "A submission from this client is still in progress", body = SubmissionResponse),
        (status = 422, description = "Invalid email", body = SubmissionResponse),
        (status = 429, description = "Submitted too recently", body = SubmissionResponse,
            headers(("Retry-After" = u64, description = "Seconds until the next submission is accepted"))),
        (status = 500, description = "Subscription could not be saved", body = SubmissionResponse),
        (status = 503, description = "Saving the subscription timed out", body = SubmissionResponse),
    )
)]
#[tracing::instrument(skip_all, fields(client = %key))]
pub async fn subscribe_newsletter(State(state): State<AppState>, key: ClientKey, Json(body): Json<FormBody>) -> SubmissionReply {
    submit(&state.forms.newsletter, &key, body).await
}
