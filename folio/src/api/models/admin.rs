//! Envelope types for the admin API.
//!
//! Every admin call may emit notifications, successful or not, so both the success and the
//! failure body carry them.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::errors::Error;
use crate::forms::validation::FieldError;
use crate::notifications::{Notification, NotificationBuffer};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminResponse<T> {
    pub data: T,
    pub notifications: Vec<Notification>,
}

impl<T> AdminResponse<T> {
    pub fn new(data: T, notifications: &NotificationBuffer) -> Self {
        Self {
            data,
            notifications: notifications.drain(),
        }
    }
}

impl<T: Serialize> IntoResponse for AdminResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// An admin response with a non-default status, e.g. `201 Created`.
#[derive(Debug)]
pub struct WithStatus<T>(pub StatusCode, pub AdminResponse<T>);

impl<T: Serialize> IntoResponse for WithStatus<T> {
    fn into_response(self) -> Response {
        (self.0, Json(self.1)).into_response()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_errors: Vec<FieldError>,
    pub notifications: Vec<Notification>,
}

/// A failed admin call: the error plus whatever was emitted before it.
#[derive(Debug)]
pub struct AdminFailure {
    pub error: Error,
    pub notifications: Vec<Notification>,
}

impl AdminFailure {
    pub fn new(error: impl Into<Error>, notifications: &NotificationBuffer) -> Self {
        Self {
            error: error.into(),
            notifications: notifications.drain(),
        }
    }
}

/// Errors raised before a controller ran, e.g. by an extractor, carry no notifications.
impl From<Error> for AdminFailure {
    fn from(error: Error) -> Self {
        Self {
            error,
            notifications: Vec::new(),
        }
    }
}

impl IntoResponse for AdminFailure {
    fn into_response(self) -> Response {
        self.error.log();

        let body = AdminErrorBody {
            message: self.error.user_message(),
            field_errors: self.error.field_errors().to_vec(),
            notifications: self.notifications,
        };
        (self.error.status_code(), Json(body)).into_response()
    }
}

pub type AdminResult<T> = std::result::Result<AdminResponse<T>, AdminFailure>;

#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteQuery {
    /// Must be `true` for the delete to happen
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InquiryStatusUpdate {
    /// One of `new`, `contacted`, `closed`
    pub status: String,
}
