use crate::classify::Classification;
use crate::utils::error::MoodError;
use crate::web::extractors::{RequestId, ValidatedJson};
use crate::web::AppState;
use crate::Result;
use axum::{
    extract::{Multipart, State},
    response::Json,
};
use serde::Deserialize;
use std::time::Instant;

/// JSON请求体（base64模式）
#[derive(Debug, Deserialize)]
pub struct PredictJsonRequest {
    /// Base64编码的图像数据
    pub image: String,
}

/// JSON base64上传处理器
pub async fn predict_json_handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    ValidatedJson(request): ValidatedJson<PredictJsonRequest>,
) -> Result<Json<Classification>> {
    let start_time = Instant::now();

    tracing::info!("Processing base64 prediction request: request_id={}", request_id);

    let result = state.engine.classify_base64(&request.image)?;

    tracing::info!(
        "Base64 prediction completed: request_id={}, prediction={}, time={:.3}s",
        request_id,
        result.prediction,
        start_time.elapsed().as_secs_f32()
    );

    Ok(Json(result))
}

/// Multipart文件上传处理器
pub async fn predict_upload_handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    mut multipart: Multipart,
) -> Result<Json<Classification>> {
    let start_time = Instant::now();

    tracing::info!("Processing multipart prediction request: request_id={}", request_id);

    let mut image_data: Option<axum::body::Bytes> = None;

    // 解析multipart数据
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        MoodError::InvalidImage(format!("Failed to read multipart field: {}", e))
    })? {
        let field_name = field.name().unwrap_or("unknown").to_string();

        match field_name.as_str() {
            "file" => {
                // 验证内容类型
                if let Some(content_type) = field.content_type() {
                    if !content_type.starts_with("image/") {
                        return Err(MoodError::UnsupportedFormat(content_type.to_string()));
                    }
                }

                let data = field.bytes().await.map_err(|e| {
                    MoodError::InvalidImage(format!("Failed to read file data: {}", e))
                })?;

                if data.is_empty() {
                    return Err(MoodError::InvalidImage("Empty file".to_string()));
                }

                tracing::debug!("Received file: {} bytes", data.len());
                image_data = Some(data);
            }
            _ => {
                tracing::debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    // 验证必需的图像数据
    let image_data = image_data
        .ok_or_else(|| MoodError::InvalidImage("No image file provided".to_string()))?;

    let result = state.engine.classify_bytes(&image_data)?;

    tracing::info!(
        "Upload prediction completed: request_id={}, prediction={}, time={:.3}s",
        request_id,
        result.prediction,
        start_time.elapsed().as_secs_f32()
    );

    Ok(Json(result))
}
