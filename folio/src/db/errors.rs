use axum::http::StatusCode;
use sqlx::error::ErrorKind;
use sqlx::postgres::PgDatabaseError;
use thiserror::Error;

/// Storage failures callers can act on. Postgres and the in-memory store both report through this.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("record not found")]
    NotFound,

    #[error("duplicate value for {}", constraint.as_deref().unwrap_or("a unique column"))]
    UniqueViolation {
        constraint: Option<String>,
        table: Option<String>,
        message: String,
        /// Offending value, when Postgres reports it in the error detail
        conflicting_value: Option<String>,
    },

    #[error("dangling reference in {}", table.as_deref().unwrap_or("a table"))]
    ForeignKeyViolation {
        constraint: Option<String>,
        table: Option<String>,
        message: String,
    },

    #[error("value rejected by {}", constraint.as_deref().unwrap_or("a check constraint"))]
    CheckViolation {
        constraint: Option<String>,
        table: Option<String>,
        message: String,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DbError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DbError::UniqueViolation { .. })
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            DbError::NotFound => StatusCode::NOT_FOUND,
            DbError::UniqueViolation { .. } => StatusCode::CONFLICT,
            DbError::ForeignKeyViolation { .. } | DbError::CheckViolation { .. } => StatusCode::BAD_REQUEST,
            DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message that is safe to show to end users. Backend text never leaks through here.
    pub fn user_message(&self) -> String {
        match self {
            DbError::NotFound => "Resource not found".to_string(),
            DbError::UniqueViolation { constraint, table, .. } => match (table.as_deref(), constraint.as_deref()) {
                (Some("newsletter_subscribers"), _) => "You're already on our mailing list!".to_string(),
                (Some("projects"), Some(c)) if c.contains("slug") => "A project with this slug already exists".to_string(),
                (Some("blogs"), Some(c)) if c.contains("slug") => "A blog post with this slug already exists".to_string(),
                (Some("users"), Some(c)) if c.contains("email") => "An account with this email address already exists".to_string(),
                _ => "Resource already exists".to_string(),
            },
            DbError::ForeignKeyViolation { .. } => "Invalid reference to related resource".to_string(),
            DbError::CheckViolation { .. } => "Invalid data provided".to_string(),
            DbError::Other(_) => "Database error occurred".to_string(),
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        let db_err = match &err {
            sqlx::Error::RowNotFound => return DbError::NotFound,
            sqlx::Error::Database(db_err) => db_err,
            _ => return DbError::Other(err.into()),
        };

        let constraint = db_err.constraint().map(str::to_string);
        let table = db_err.table().map(str::to_string);
        let message = db_err.message().to_string();

        match db_err.kind() {
            ErrorKind::UniqueViolation => DbError::UniqueViolation {
                conflicting_value: db_err
                    .try_downcast_ref::<PgDatabaseError>()
                    .and_then(PgDatabaseError::detail)
                    .and_then(extract_conflicting_value),
                constraint,
                table,
                message,
            },
            ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation { constraint, table, message },
            ErrorKind::CheckViolation => DbError::CheckViolation { constraint, table, message },
            _ => DbError::Other(err.into()),
        }
    }
}

/// Pulls `my-project` out of `Key (slug)=(my-project) already exists.`
fn extract_conflicting_value(detail: &str) -> Option<String> {
    let start = detail.find("=(")? + 2;
    let end = detail[start..].find(") already exists")?;
    Some(detail[start..start + end].to_string())
}

pub type Result<T> = std::result::Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn unique(table: &str, constraint: &str) -> DbError {
        DbError::UniqueViolation {
            constraint: Some(constraint.to_string()),
            table: Some(table.to_string()),
            message: format!("duplicate key value violates unique constraint \"{constraint}\""),
            conflicting_value: None,
        }
    }

    #[test]
    fn test_extract_conflicting_value() {
        assert_eq!(
            extract_conflicting_value("Key (slug)=(my-project) already exists."),
            Some("my-project".to_string())
        );
        assert_eq!(
            extract_conflicting_value("Key (email)=(a(b)@example.com) already exists."),
            Some("a(b)@example.com".to_string())
        );
        assert_eq!(extract_conflicting_value("something else entirely"), None);
    }

    #[test]
    fn test_user_message_hides_backend_text() {
        let err = DbError::Other(anyhow::anyhow!("connection refused on 10.0.0.3:5432"));
        assert_eq!(err.user_message(), "Database error occurred");
        assert!(!err.is_unique_violation());
    }

    #[test]
    fn test_user_message_for_unique_violations() {
        assert_eq!(
            unique("newsletter_subscribers", "newsletter_subscribers_email_unique").user_message(),
            "You're already on our mailing list!"
        );
        assert_eq!(
            unique("projects", "projects_slug_unique").user_message(),
            "A project with this slug already exists"
        );
        assert_eq!(
            unique("blogs", "blogs_slug_unique").user_message(),
            "A blog post with this slug already exists"
        );
        assert_eq!(unique("testimonials", "whatever").user_message(), "Resource already exists");
        assert!(unique("projects", "projects_slug_unique").is_unique_violation());
    }
}
