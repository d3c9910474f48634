pub mod handlers;
pub mod middleware;
pub mod extractors;
pub mod ui;

use crate::classify::DecisionEngine;
use crate::image::preprocessing::{INPUT_CHANNELS, INPUT_HEIGHT, INPUT_WIDTH};
use crate::models::{ModelStats, OnnxMoodModel};
use crate::{Config, Result};
use axum::extract::State;
use axum::{
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, timeout::TimeoutLayer};

/// 应用共享状态
///
/// 模型句柄在启动时显式构造一次，只读共享给所有请求，
/// 进程退出时随状态一起释放。
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub engine: Arc<DecisionEngine>,
}

pub async fn serve(config: Config) -> Result<()> {
    // 加载模型并构造决策引擎
    let model = OnnxMoodModel::new(&config)?;
    let engine = Arc::new(DecisionEngine::new(Arc::new(model)));

    let state = AppState {
        config: config.clone(),
        engine,
    };

    // 构建应用路由
    let app = create_app(state);

    // 解析绑定地址
    let addr: SocketAddr = config.bind_addr.parse().map_err(|e| {
        crate::utils::error::MoodError::Config(format!(
            "Invalid bind address {}: {}",
            config.bind_addr, e
        ))
    })?;

    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("API endpoints:");
    tracing::info!("  POST /predict        - Multipart file upload");
    tracing::info!("  POST /predict/base64 - JSON base64 upload");
    tracing::info!("  GET  /               - Web UI");
    tracing::info!("  GET  /health         - Health check");
    tracing::info!("  GET  /api/info       - Service information");

    // 启动服务器
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        crate::utils::error::MoodError::Internal(format!(
            "Failed to bind to address {}: {}",
            addr, e
        ))
    })?;

    axum::serve(listener, app).await.map_err(|e| {
        crate::utils::error::MoodError::Internal(format!("Server failed to start: {}", e))
    })?;

    Ok(())
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        // 预测API路由
        .route("/predict", post(handlers::predict_upload_handler))
        .route("/predict/", post(handlers::predict_upload_handler))
        .route("/predict/base64", post(handlers::predict_json_handler))
        // Web UI路由
        .route("/", get(ui::index_handler))
        // 系统路由
        .route("/health", get(health_handler))
        .route("/api/info", get(info_handler))
        // 添加中间件 - 使用分层模式避免复杂类型嵌套
        .layer(axum::middleware::from_fn(middleware::request_logging))
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(RequestBodyLimitLayer::new(
            state.config.server_config.max_request_size,
        ))
        .layer(TimeoutLayer::new(Duration::from_secs(
            state.config.server_config.request_timeout,
        )))
        .layer(CorsLayer::permissive()) // 本地调用使用宽松CORS
        .with_state(state)
}

/// 健康检查端点
async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// 服务信息端点
async fn info_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let stats = ModelStats {
        input_height: INPUT_HEIGHT,
        input_width: INPUT_WIDTH,
        input_channels: INPUT_CHANNELS,
        intra_threads: state.config.onnx_config.intra_threads,
        optimization_level: state.config.onnx_config.optimization_level,
    };

    Json(json!({
        "service": "ONNX Mood Classification Service",
        "version": env!("CARGO_PKG_VERSION"),
        "description": env!("CARGO_PKG_DESCRIPTION"),
        "labels": ["Happy", "Sad"],
        "model": stats,
    }))
}
