//! 运行状态模型

use serde::Serialize;
use std::fmt;

/// 运行状态标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// 仍在作答
    Running,
    /// 链走到头且最后一题答对
    DoneSuccess,
    /// 答错或某一步失败
    DoneFailure,
    /// 达到轮数上限仍未终结
    DoneExhausted,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunStatus::Running)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunStatus::Running => "running",
            RunStatus::DoneSuccess => "done_success",
            RunStatus::DoneFailure => "done_failure",
            RunStatus::DoneExhausted => "done_exhausted",
        };
        write!(f, "{}", label)
    }
}

/// 单次运行的可变状态
///
/// 不变式: Running 期间 current_url 非空；round 单调递增且不超过轮数上限。
#[derive(Debug, Clone, Serialize)]
pub struct RunState {
    /// 当前待作答（或最后作答）的页面
    pub current_url: Option<String>,
    /// 已开始的轮数
    pub round: u32,
    pub status: RunStatus,
}

impl RunState {
    pub fn new(start_url: impl Into<String>) -> Self {
        Self {
            current_url: Some(start_url.into()),
            round: 0,
            status: RunStatus::Running,
        }
    }
}
