use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

/// Wrapper for API responses that adds the `{success, message, data}` envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub message: String,
    pub status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            data: Some(data),
            message: message.into(),
            status_code: StatusCode::OK,
        }
    }

    /// Create a 201 Created response
    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self {
            data: Some(data),
            message: message.into(),
            status_code: StatusCode::CREATED,
        }
    }
}

impl ApiResponse<()> {
    /// A success envelope without a `data` key
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            data: None,
            message: message.into(),
            status_code: StatusCode::OK,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let mut envelope = json!({
            "success": true,
            "message": self.message,
        });

        if let Some(data) = self.data {
            match serde_json::to_value(&data) {
                Ok(value) => envelope["data"] = value,
                Err(e) => {
                    tracing::error!("Failed to serialize response data: {}", e);
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({
                            "success": false,
                            "message": "Failed to serialize response data"
                        })),
                    )
                        .into_response();
                }
            }
        }

        (self.status_code, Json(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
