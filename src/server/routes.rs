//! HTTP 路由 - 接入层

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::models::QuizTask;
use crate::server::AppState;

/// webhook 请求体（线上字段名，不可改）
#[derive(Debug, Deserialize)]
pub struct SolveRequest {
    pub email: String,
    pub secret: String,
    pub url: String,
}

/// webhook 确认响应
#[derive(Debug, Serialize)]
pub struct SolveAck {
    pub message: String,
    pub run_id: String,
    pub received_url: String,
}

/// 存活探测
#[get("/")]
pub async fn home() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "message": "Quiz solver is running!" }))
}

/// 接收测验任务：校验密钥，立即确认，后台求解
#[post("/solve")]
pub async fn solve_quiz(
    state: web::Data<AppState>,
    request: web::Json<SolveRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();
    info!("📨 收到测验任务: email={}, url={}", request.email, request.url);

    if request.secret != state.config.webhook_secret {
        warn!("⚠️ 密钥校验失败, 拒绝任务: {}", request.url);
        return Err(ApiError::InvalidSecret);
    }

    let task = QuizTask {
        email: request.email,
        start_url: request.url.clone(),
    };
    let run_id = state.spawn_run(task).await;

    Ok(HttpResponse::Ok().json(SolveAck {
        message: "Task received. Solving in background.".to_string(),
        run_id,
        received_url: request.url,
    }))
}

/// 查询一次运行的状态快照
#[get("/runs/{run_id}")]
pub async fn run_status(
    state: web::Data<AppState>,
    run_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let run_id = run_id.into_inner();
    match state.registry.snapshot(&run_id).await {
        Some(record) => Ok(HttpResponse::Ok().json(record)),
        None => Err(ApiError::RunNotFound(run_id)),
    }
}
