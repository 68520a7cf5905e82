use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use super::responses::MessageResponse;

/// Client-facing errors. The display string is the whole response message; upstream
/// and store failures are logged by the handler and never included here.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Malformed request body")]
    MalformedBody,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Unauthorized: Please log in first")]
    NotLoggedIn,
    #[error("Error tracking login count or storing session")]
    LoginTracking,
    #[error("Error fetching photos")]
    PhotoFetch,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedBody => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::NotLoggedIn => StatusCode::UNAUTHORIZED,
            ApiError::LoginTracking | ApiError::PhotoFetch => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(MessageResponse {
            message: self.to_string(),
        });
        (self.status(), body).into_response()
    }
}
