//! 测验运行器 - 流程层
//!
//! 核心职责：驱动"一次运行"的轮次状态机
//!
//! 每一轮：
//! 1. 渲染当前页面 → 可见文本
//! 2. LLM 推导 → 答案 + 提交地址
//! 3. 提交答案 → 判定结果
//!
//! 状态转移：
//! - 答对且有下一题 → 前进到新地址继续
//! - 答对且无下一题 → DoneSuccess
//! - 答错 → DoneFailure（同一题不重试）
//! - 任一步出错 → 记日志后 DoneFailure
//! - 轮数耗尽仍未终结 → DoneExhausted

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::SolveResult;
use crate::models::{AnswerPayload, QuizTask, RunState, RunStatus, SubmissionResult};
use crate::services::{
    AnswerDeriver, AnswerSubmitter, ChromeRenderer, HttpSubmitter, LlmDeriver, PageRenderer,
};
use crate::utils::truncate_text;

/// 测验运行器
///
/// 职责：
/// - 编排 渲染 → 推导 → 提交 的完整轮次
/// - 维护 [`RunState`] 并执行状态转移
/// - 不持有浏览器等资源，只依赖注入的业务能力
pub struct QuizRunner<'a> {
    renderer: &'a dyn PageRenderer,
    deriver: &'a dyn AnswerDeriver,
    submitter: &'a dyn AnswerSubmitter,
    secret: String,
    max_rounds: u32,
}

impl<'a> QuizRunner<'a> {
    /// 创建新的测验运行器
    pub fn new(
        renderer: &'a dyn PageRenderer,
        deriver: &'a dyn AnswerDeriver,
        submitter: &'a dyn AnswerSubmitter,
        secret: impl Into<String>,
        max_rounds: u32,
    ) -> Self {
        Self {
            renderer,
            deriver,
            submitter,
            secret: secret.into(),
            max_rounds,
        }
    }

    /// 跑完一次运行，返回终态
    pub async fn run(&self, task: &QuizTask) -> RunState {
        let mut state = RunState::new(&task.start_url);
        info!(
            "🚀 开始求解测验链: {} (上限 {} 轮)",
            task.start_url, self.max_rounds
        );

        while state.status == RunStatus::Running && state.round < self.max_rounds {
            let url = match state.current_url.clone() {
                Some(url) => url,
                None => break, // Running 状态下 current_url 恒为 Some
            };
            state.round += 1;

            match self.play_round(task, state.round, &url).await {
                Ok(result) => self.apply_transition(&mut state, result),
                Err(e) => {
                    error!("[第 {} 轮] ❌ 运行失败 (页面: {}): {}", state.round, url, e);
                    state.status = RunStatus::DoneFailure;
                }
            }
        }

        if state.status == RunStatus::Running {
            state.status = RunStatus::DoneExhausted;
        }

        self.log_summary(&state);
        state
    }

    /// 执行一轮: 渲染 → 推导 → 提交
    async fn play_round(
        &self,
        task: &QuizTask,
        round: u32,
        url: &str,
    ) -> SolveResult<SubmissionResult> {
        info!("[第 {} 轮] 🔍 渲染页面: {}", round, url);
        let page_text = self.renderer.render(url).await?;

        info!(
            "[第 {} 轮] 🤖 推导答案 (页面文本 {} 字符)...",
            round,
            page_text.chars().count()
        );
        let derived = self.deriver.derive(&page_text).await?;
        info!(
            "[第 {} 轮] ✓ 答案: {} → 提交到 {}",
            round,
            truncate_text(&derived.answer.to_string(), 80),
            derived.submit_url
        );

        let payload = AnswerPayload {
            email: task.email.clone(),
            secret: self.secret.clone(),
            // 来源页地址，不是提交地址
            url: url.to_string(),
            answer: derived.answer,
        };

        info!("[第 {} 轮] 📤 提交答案...", round);
        self.submitter.submit(&derived.submit_url, &payload).await
    }

    /// 按判定结果执行状态转移
    fn apply_transition(&self, state: &mut RunState, result: SubmissionResult) {
        if result.correct {
            match result.next_url {
                Some(next) => {
                    info!("[第 {} 轮] ✅ 答对，下一题: {}", state.round, next);
                    state.current_url = Some(next);
                }
                None => {
                    info!("[第 {} 轮] ✅ 答对，测验链到此结束", state.round);
                    state.status = RunStatus::DoneSuccess;
                }
            }
        } else {
            warn!("[第 {} 轮] ❌ 答错，运行结束", state.round);
            state.status = RunStatus::DoneFailure;
        }
    }

    // ========== 日志辅助方法 ==========

    fn log_summary(&self, state: &RunState) {
        match state.status {
            RunStatus::DoneSuccess => info!("✅ 测验链完成: 共 {} 轮全部答对", state.round),
            RunStatus::DoneFailure => warn!("❌ 运行失败: 止步于第 {} 轮", state.round),
            RunStatus::DoneExhausted => {
                warn!("⚠️ 轮数耗尽: 跑满 {} 轮未见链尾", state.round)
            }
            RunStatus::Running => {}
        }
    }
}

/// 执行一次完整的测验运行
///
/// 由 webhook 接入层 detach 调用：自建渲染器（独占一个浏览器），
/// 复用进程级共享的推导器与提交器，结束后回收浏览器。
pub async fn run_quiz_task(
    task: QuizTask,
    config: Arc<Config>,
    deriver: Arc<LlmDeriver>,
    submitter: Arc<HttpSubmitter>,
) -> RunState {
    let renderer = ChromeRenderer::new(&config);
    let runner = QuizRunner::new(
        &renderer,
        deriver.as_ref(),
        submitter.as_ref(),
        config.webhook_secret.clone(),
        config.max_rounds,
    );
    let state = runner.run(&task).await;
    renderer.shutdown().await;
    state
}
