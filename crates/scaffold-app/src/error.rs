use axum::{
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use scaffold_types::ErrorObject;
use serde_json::Value;
use tracing::{debug, error};

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// One violated constraint of one attribute
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeError {
    pub attribute: String,
    pub value: Value,
    pub message: String,
}

impl AttributeError {
    fn to_error_object(&self, status: StatusCode) -> ErrorObject {
        ErrorObject {
            status: status.as_u16(),
            title: format!("Invalid Attributes: {} = {}", self.attribute, self.value),
            detail: format!("{}: {}", self.attribute, self.message),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Could not find item with id: {0}")]
    NotFound(String),
    #[error("Invalid attributes ({} errors)", .0.len())]
    InvalidAttributes(Vec<AttributeError>),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotImplemented(String),
    #[error("{0}")]
    Internal(String),
    #[error(transparent)]
    Dal(scaffold_dal::Error),
}

impl From<scaffold_dal::Error> for ApiError {
    fn from(err: scaffold_dal::Error) -> Self {
        match err {
            scaffold_dal::Error::RecordNotFound { id, .. } => ApiError::NotFound(id.to_string()),
            other => ApiError::Dal(other),
        }
    }
}

impl From<scaffold_dal::SqlxError> for ApiError {
    fn from(err: scaffold_dal::SqlxError) -> Self {
        ApiError::Dal(err.into())
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidAttributes(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            ApiError::Internal(_) | ApiError::Dal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ApiError::NotFound(_) => "Entity Not Found",
            ApiError::InvalidAttributes(_) => "Invalid Attributes",
            ApiError::BadRequest(_) => "Bad Request",
            ApiError::NotImplemented(_) => "Not Implemented",
            ApiError::Internal(_) => "Internal Server Error",
            ApiError::Dal(e) => e.name(),
        }
    }

    /// Error objects as sent to client, invalid attributes give one object per violation
    pub fn error_objects(&self) -> Vec<ErrorObject> {
        let status = self.status_code();
        match self {
            ApiError::InvalidAttributes(errors) => errors
                .iter()
                .map(|e| e.to_error_object(status))
                .collect(),
            _ => vec![ErrorObject {
                status: status.as_u16(),
                title: self.title().to_string(),
                detail: self.to_string(),
            }],
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {self}");
        } else {
            debug!("Request rejected: {self}");
        }
        let mut errors = self.error_objects();
        match self {
            ApiError::InvalidAttributes(_) => (status, Json(errors)).into_response(),
            _ => match errors.pop() {
                Some(error) => (status, Json(error)).into_response(),
                None => status.into_response(),
            },
        }
    }
}
