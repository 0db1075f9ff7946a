//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use board_core::{RepoError, ServiceError};
use log::error;
use serde_json::json;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::BadRequest(message)
            | Self::NotFound(message)
            | Self::Conflict(message)
            | Self::Internal(message) => message,
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status(), self.message())
    }
}

impl std::error::Error for ApiError {}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::BadRequest(err.to_string()),
            RepoError::NotPersisted(_) => Self::BadRequest(value.to_string()),
            RepoError::ArticleNotFound(_) | RepoError::CommentNotFound(_) => {
                Self::NotFound(value.to_string())
            }
            other if other.is_constraint_violation() => Self::Conflict(other.to_string()),
            other => {
                error!("event=store_failure module=server status=error error={other}");
                Self::Internal(other.to_string())
            }
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        match value {
            ServiceError::Repo(err) => err.into(),
            ServiceError::Audit(err) => {
                error!("event=audit_capture module=server status=error error={err}");
                Self::Internal(err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = json!({
            "status": status.as_u16(),
            "error": status.canonical_reason().unwrap_or("Error"),
            "message": self.message(),
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;
    use axum::http::StatusCode;
    use board_core::{AuditError, RepoError, ServiceError, ValidationError};

    #[test]
    fn repo_errors_map_to_http_statuses() {
        let validation = RepoError::Validation(ValidationError::BlankField {
            entity: "article",
            field: "title",
        });
        assert_eq!(ApiError::from(validation).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(RepoError::ArticleNotFound(3)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(RepoError::InvalidData("broken".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn missing_auditor_is_a_server_fault() {
        let err = ApiError::from(ServiceError::Audit(AuditError::MissingAuditor));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
