use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use std::collections::BTreeMap;
use std::fmt;

use super::types::ErrorBody;
use crate::services::AuthError;

/// Per-field validation messages, keyed by the JSON field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    ValidationError {
        message: String,
        fields: Option<FieldErrors>,
    },

    Conflict(String),

    InternalError(String),

    Unauthorized(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::ValidationError { message, .. } => write!(f, "Validation error: {message}"),
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, fields) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            Self::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                    None,
                )
            }
            Self::ValidationError { message, fields } => {
                (StatusCode::BAD_REQUEST, message, fields)
            }
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg, None),
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
        };

        let body = ErrorBody {
            error: error_message,
            fields,
        };
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<DbErr>().and_then(DbErr::sql_err) {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                Self::Conflict("A record with the same unique value already exists".to_string())
            }
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                Self::validation("Referenced record does not exist or is still in use")
            }
            _ => Self::DatabaseError(format!("{err:#}")),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::NoAccessProfile => {
                Self::Unauthorized(err.to_string())
            }
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Configuration(_) | AuthError::Internal(_) => {
                Self::InternalError(err.to_string())
            }
        }
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        Self::NotFound(format!("{resource} {id} not found"))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError {
            message: msg.into(),
            fields: None,
        }
    }

    pub fn invalid_fields(fields: FieldErrors) -> Self {
        Self::ValidationError {
            message: "One or more fields are invalid".to_string(),
            fields: Some(fields),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_errors_map_to_unauthorized() {
        let invalid = ApiError::from(AuthError::InvalidCredentials);
        assert_eq!(invalid.into_response().status(), StatusCode::UNAUTHORIZED);

        let no_role = ApiError::from(AuthError::NoAccessProfile);
        assert!(matches!(&no_role, ApiError::Unauthorized(msg) if msg == "User has no valid access profile"));
    }

    #[test]
    fn test_configuration_fault_is_opaque() {
        let err = ApiError::from(AuthError::Configuration("key missing".to_string()));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_plain_anyhow_is_database_error() {
        let err = ApiError::from(anyhow::anyhow!("disk I/O error"));
        assert!(matches!(err, ApiError::DatabaseError(_)));
    }

    #[test]
    fn test_field_errors_are_bad_request() {
        let mut fields = FieldErrors::new();
        fields.insert("plate".to_string(), vec!["must not be empty".to_string()]);
        let response = ApiError::invalid_fields(fields).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
