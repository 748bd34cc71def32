// API error type shared by the HTTP handlers
use crate::application::auth_service::AuthError;
use crate::domain::filter::FilterError;
use crate::domain::settings::SettingsError;
use crate::infrastructure::csv_export::ExportError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("export failed: {0}")]
    Export(#[from] ExportError),

    #[error("internal error")]
    Status(StatusCode),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Filter(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::Settings(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Status(status) => *status,
        }
    }
}

impl From<StatusCode> for ApiError {
    fn from(status: StatusCode) -> Self {
        ApiError::Status(status)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
