//! JSON error responses for the HTTP handlers.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::domains::provisioning::{PartialProgress, ProvisioningError};

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    progress: Option<PartialProgress>,
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    #[serde(flatten)]
    progress: Option<PartialProgress>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            progress: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ProvisioningError> for ApiError {
    fn from(err: ProvisioningError) -> Self {
        let status = match &err {
            ProvisioningError::StepFailed { .. } => StatusCode::BAD_REQUEST,
            ProvisioningError::BootstrapIdentity(_) => StatusCode::BAD_REQUEST,
            ProvisioningError::BootstrapDisabled => StatusCode::FORBIDDEN,
            ProvisioningError::ListUsers(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        Self {
            status,
            progress: err.partial_progress(),
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: self.message,
            progress: self.progress,
        };
        (self.status, Json(body)).into_response()
    }
}
