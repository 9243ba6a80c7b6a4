use crate::admin::crud::AdminError;
use crate::db::errors::DbError;
use crate::forms::validation::FieldError;
use crate::types::Operation;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error as ThisError;

/// Everything a request handler can fail with. Converts into an HTTP response with a body that
/// never carries internal detail.
#[derive(ThisError, Debug)]
pub enum Error {
    #[error("Not authenticated")]
    Unauthenticated { message: Option<String> },

    #[error("Insufficient permissions to {action} {resource}")]
    InsufficientPermissions { action: Operation, resource: String },

    #[error("{message}")]
    BadRequest { message: String },

    /// Submitted fields that failed their rules, in schema order
    #[error("Validation failed for {} field(s)", errors.len())]
    Validation { errors: Vec<FieldError> },

    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Failed step on our side; `operation` is logged, not returned
    #[error("Failed to {operation}")]
    Internal { operation: String },

    #[error(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Error::InsufficientPermissions { .. } => StatusCode::FORBIDDEN,
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Conflict { .. } => StatusCode::CONFLICT,
            Error::Database(db_err) => db_err.status_code(),
            Error::Internal { .. } | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Error::Unauthenticated { message } => message.clone().unwrap_or_else(|| "Authentication required".to_string()),
            Error::Validation { errors } => match errors.as_slice() {
                [single] => single.message.clone(),
                _ => "Please correct the highlighted fields".to_string(),
            },
            Error::Conflict { message } | Error::BadRequest { message } => message.clone(),
            Error::InsufficientPermissions { .. } | Error::NotFound { .. } => self.to_string(),
            Error::Database(db_err) => db_err.user_message(),
            Error::Internal { .. } | Error::Other(_) => "Internal server error".to_string(),
        }
    }

    /// Field level errors, if this is a validation failure
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Error::Validation { errors } => errors,
            _ => &[],
        }
    }

    /// Server faults at error, constraint hits and conflicts at warn, auth at info, the rest at debug.
    pub fn log(&self) {
        match self {
            Error::Internal { .. } | Error::Other(_) | Error::Database(DbError::Other(_)) => {
                tracing::error!(error = %format!("{self:#}"), "request failed");
            }
            Error::Database(_) | Error::Conflict { .. } => tracing::warn!(error = %self, "request conflicts with stored data"),
            Error::Unauthenticated { .. } | Error::InsufficientPermissions { .. } => tracing::info!(error = %self, "request denied"),
            Error::BadRequest { .. } | Error::NotFound { .. } | Error::Validation { .. } => {
                tracing::debug!(error = %self, "request rejected");
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.log();

        let status = self.status_code();

        match &self {
            Error::Validation { errors } => {
                let body = json!({
                    "message": self.user_message(),
                    "field_errors": errors,
                });
                (status, axum::response::Json(body)).into_response()
            }
            // Unique violations name the resource so clients can point at the right field
            Error::Database(db_err @ DbError::UniqueViolation { table, .. }) => {
                let resource = match table.as_deref() {
                    Some("projects") => "project",
                    Some("blogs") => "blog",
                    Some("newsletter_subscribers") => "subscriber",
                    Some("users") => "user",
                    _ => "unknown",
                };
                let body = json!({
                    "message": db_err.user_message(),
                    "resource": resource,
                });
                (status, axum::response::Json(body)).into_response()
            }
            _ => (status, self.user_message()).into_response(),
        }
    }
}

impl From<AdminError> for Error {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::Invalid(errors) => Error::Validation { errors },
            AdminError::ConfirmationRequired => Error::BadRequest {
                message: "Deletion must be confirmed with confirm=true".to_string(),
            },
            AdminError::Persistence(db_err) => Error::Database(db_err),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::Unauthenticated { message: None }.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            Error::InsufficientPermissions {
                action: Operation::Manage,
                resource: "projects".to_string()
            }
            .status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(Error::Database(DbError::NotFound).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::Validation { errors: vec![] }.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_internal_details_are_not_exposed() {
        let err = Error::Other(anyhow::anyhow!("password=hunter2 rejected by upstream"));
        assert_eq!(err.user_message(), "Internal server error");

        let err = Error::Internal {
            operation: "decrypt secret".to_string(),
        };
        assert_eq!(err.user_message(), "Internal server error");
    }

    #[test]
    fn test_admin_errors_convert() {
        let err: Error = AdminError::Invalid(vec![FieldError::new("title", "Title is required")]).into();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.user_message(), "Title is required");
        assert_eq!(err.field_errors().len(), 1);

        let err: Error = AdminError::ConfirmationRequired.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err: Error = AdminError::Persistence(DbError::NotFound).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
