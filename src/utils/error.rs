use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MoodError {
    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Model invocation failed: {0}")]
    ModelInvocation(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("File too large: {0} bytes, max allowed: {1} bytes")]
    FileTooLarge(usize, usize),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Image decode error: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("ORT error: {0}")]
    Ort(#[from] ort::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl MoodError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            MoodError::InvalidImage(_) => StatusCode::BAD_REQUEST,
            MoodError::ImageDecode(_) => StatusCode::BAD_REQUEST,
            MoodError::FileTooLarge(_, _) => StatusCode::PAYLOAD_TOO_LARGE,
            MoodError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            MoodError::Base64(_) => StatusCode::BAD_REQUEST,
            MoodError::Json(_) => StatusCode::BAD_REQUEST,
            MoodError::ModelLoad(_) => StatusCode::SERVICE_UNAVAILABLE,
            MoodError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            MoodError::ModelLoad(_) => "MODEL_LOAD_ERROR",
            MoodError::ModelInvocation(_) => "MODEL_INVOCATION_ERROR",
            MoodError::InvalidImage(_) => "INVALID_IMAGE",
            MoodError::FileTooLarge(_, _) => "FILE_TOO_LARGE",
            MoodError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            MoodError::Config(_) => "CONFIG_ERROR",
            MoodError::Io(_) => "IO_ERROR",
            MoodError::Json(_) => "JSON_ERROR",
            MoodError::Base64(_) => "BASE64_DECODE_ERROR",
            MoodError::ImageDecode(_) => "IMAGE_DECODE_ERROR",
            MoodError::Ort(_) => "ORT_ERROR",
            MoodError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for MoodError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = serde_json::json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
            }
        });

        tracing::error!("Request failed: {} ({})", self, status);

        (status, axum::Json(error_response)).into_response()
    }
}
