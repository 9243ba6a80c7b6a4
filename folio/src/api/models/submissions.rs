//! Public form payloads and the submission response.

use std::collections::HashMap;

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::forms::{
    controller::{FormState, SubmitOutcome},
    validation::{FieldError, RawForm},
};
use crate::notifications::Notification;

/// Fields of the contact form. Unknown keys are ignored, `null` counts as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    /// One of `website`, `web-app`, `ecommerce`, `other`
    pub project_type: Option<String>,
    /// One of `5k-10k`, `10k-25k`, `25k-50k`, `50k+`
    pub budget_range: Option<String>,
    pub message: String,
    /// Must be left empty
    pub website: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct NewsletterRequest {
    pub email: String,
    /// Must be left empty
    pub website: Option<String>,
}

/// A form body as loosely typed key/value pairs.
///
/// The bot trap field name is configurable, so the body is not bound to a struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct FormBody(HashMap<String, Option<serde_json::Value>>);

impl FormBody {
    /// String values as-is, numbers and booleans in their JSON form, `null` dropped
    pub fn into_raw(self) -> RawForm {
        self.0
            .into_iter()
            .filter_map(|(key, value)| match value? {
                serde_json::Value::String(s) => Some((key, s)),
                serde_json::Value::Null => None,
                other => Some((key, other.to_string())),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmissionResponse {
    /// Form state after this submission
    pub state: FormState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_errors: Vec<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_seconds: Option<u64>,
    pub notifications: Vec<Notification>,
}

/// Outcome of one submission, rendered with the matching status code.
#[derive(Debug)]
pub struct SubmissionReply {
    pub outcome: SubmitOutcome,
    pub state: FormState,
    pub notifications: Vec<Notification>,
}

impl SubmissionReply {
    pub fn status_code(&self) -> StatusCode {
        match &self.outcome {
            SubmitOutcome::Accepted => StatusCode::CREATED,
            SubmitOutcome::Duplicate { .. } => StatusCode::OK,
            SubmitOutcome::Invalid { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            SubmitOutcome::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            SubmitOutcome::InFlight => StatusCode::CONFLICT,
            SubmitOutcome::Failed { timed_out: true, .. } => StatusCode::SERVICE_UNAVAILABLE,
            SubmitOutcome::Failed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SubmissionReply> for SubmissionResponse {
    fn from(reply: SubmissionReply) -> Self {
        let success_message = reply.notifications.first().and_then(|n| n.description.clone());
        let (message, field_errors, retry_after_seconds) = match reply.outcome {
            SubmitOutcome::Accepted => (success_message, Vec::new(), None),
            SubmitOutcome::Duplicate { message } => (Some(message), Vec::new(), None),
            SubmitOutcome::RateLimited { wait_seconds, message } => (Some(message), Vec::new(), Some(wait_seconds)),
            SubmitOutcome::Invalid { errors } => (None, errors, None),
            SubmitOutcome::Failed { message, .. } => (Some(message), Vec::new(), None),
            SubmitOutcome::InFlight => (Some("A submission is already in progress".to_string()), Vec::new(), None),
        };

        Self {
            state: reply.state,
            message,
            field_errors,
            retry_after_seconds,
            notifications: reply.notifications,
        }
    }
}

impl IntoResponse for SubmissionReply {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let retry_after = match &self.outcome {
            SubmitOutcome::RateLimited { wait_seconds, .. } => Some(HeaderValue::from(*wait_seconds)),
            _ => None,
        };

        let mut response = (status, Json(SubmissionResponse::from(self))).into_response();
        if let Some(value) = retry_after {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_body_flattens_values() {
        let body: FormBody = serde_json::from_value(serde_json::json!({
            "name": "Jane",
            "company": null,
            "website": "",
            "budget": 5000
        }))
        .unwrap();

        let raw = body.into_raw();
        assert_eq!(raw.get("name").map(String::as_str), Some("Jane"));
        assert_eq!(raw.get("website").map(String::as_str), Some(""));
        assert_eq!(raw.get("budget").map(String::as_str), Some("5000"));
        assert!(!raw.contains_key("company"));
    }

    #[test]
    fn test_rate_limited_reply() {
        let reply = SubmissionReply {
            outcome: SubmitOutcome::RateLimited {
                wait_seconds: 42,
                message: "You can submit again in 42 seconds.".to_string(),
            },
            state: FormState::Error,
            notifications: vec![],
        };
        assert_eq!(reply.status_code(), StatusCode::TOO_MANY_REQUESTS);

        let response = reply.into_response();
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");
    }

    #[test]
    fn test_timeouts_are_unavailable() {
        let reply = SubmissionReply {
            outcome: SubmitOutcome::Failed {
                message: "Please try again later.".to_string(),
                timed_out: true,
            },
            state: FormState::Error,
            notifications: vec![],
        };
        assert_eq!(reply.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let body = SubmissionResponse::from(reply);
        assert_eq!(body.message.as_deref(), Some("Please try again later."));
        assert!(body.retry_after_seconds.is_none());
    }
}
