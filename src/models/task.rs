//! 测验任务数据模型

use serde::Serialize;
use serde_json::Value;

/// 一次测验运行的输入（webhook 校验通过后构造，运行期间不变）
#[derive(Debug, Clone)]
pub struct QuizTask {
    /// 参与者邮箱，随每次提交原样带上
    pub email: String,
    /// 测验链的起始页面
    pub start_url: String,
}

/// LLM 推导出的结构化答案
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedAnswer {
    /// 答案本身，不做语义校验，原样转发
    pub answer: Value,
    /// 答案应提交到的地址
    pub submit_url: String,
}

/// 提交给测验服务器的请求体
///
/// 字段名是与对端约定的线上格式，不可改名。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerPayload {
    pub email: String,
    pub secret: String,
    /// 刚作答的页面地址（来源页，不是提交地址）
    pub url: String,
    pub answer: Value,
}

/// 测验服务器对一次提交的判定
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionResult {
    /// 答案是否正确，响应缺失该字段时视为 false
    pub correct: bool,
    /// 下一题地址，缺失或为空表示链到此为止
    pub next_url: Option<String>,
    /// 原始 HTTP 状态码，仅用于日志
    pub raw_status: u16,
}
