//! 答案提交服务 - 业务能力层
//!
//! 只负责"答案 → 判定结果"能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `reqwest` 发送 JSON POST
//! - 按宽松约定解析响应: `correct` 缺失当 false，`url` 缺失表示链结束

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{SolveError, SolveResult};
use crate::models::{AnswerPayload, SubmissionResult};
use crate::utils::truncate_text;

/// 答案提交能力
#[async_trait]
pub trait AnswerSubmitter: Send + Sync {
    /// 提交答案并解析判定结果
    async fn submit(
        &self,
        submit_url: &str,
        payload: &AnswerPayload,
    ) -> SolveResult<SubmissionResult>;
}

/// 基于 HTTP 的答案提交器
///
/// 职责：
/// - 对提交地址做恰好一次 JSON POST，失败不重试
/// - 无状态，可被多个运行并发共享
pub struct HttpSubmitter {
    client: reqwest::Client,
}

impl HttpSubmitter {
    /// 创建新的提交器（带固定请求超时）
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.submit_timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl AnswerSubmitter for HttpSubmitter {
    async fn submit(
        &self,
        submit_url: &str,
        payload: &AnswerPayload,
    ) -> SolveResult<SubmissionResult> {
        debug!("📤 提交答案到: {}", submit_url);

        let response = self
            .client
            .post(submit_url)
            .json(payload)
            .send()
            .await
            .map_err(|e| SolveError::submit(submit_url, e))?;

        let raw_status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| SolveError::submit(submit_url, e))?;
        info!(
            "✓ 提交响应 (HTTP {}): {}",
            raw_status,
            truncate_text(&body, 300)
        );

        parse_submission_body(submit_url, raw_status, &body)
    }
}

/// 解析提交响应体
///
/// 响应必须是 JSON，字段按宽松约定读取:
/// - `correct` 缺失或非布尔 → false
/// - `url` 缺失、null 或空白 → 没有下一题
///
/// HTTP 状态码只记录不判错，判定完全以响应体为准。
pub fn parse_submission_body(
    submit_url: &str,
    raw_status: u16,
    body: &str,
) -> SolveResult<SubmissionResult> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| SolveError::submit(submit_url, e))?;

    let correct = value
        .get("correct")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    let next_url = value
        .get("url")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from);

    Ok(SubmissionResult {
        correct,
        next_url,
        raw_status,
    })
}
