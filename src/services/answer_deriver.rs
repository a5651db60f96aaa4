//! 答案推导服务 - 业务能力层
//!
//! 只负责"页面文本 → 结构化答案"能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{SolveError, SolveResult};
use crate::models::DerivedAnswer;
use crate::utils::truncate_text;

/// 发给模型的固定指令
///
/// 与测验页面的约定: 页面文本里写明了提交地址，模型必须裸返回
/// 只含 `answer` 和 `submit_url` 两个键的 JSON 对象。
const SYSTEM_PROMPT: &str = "You are an automated quiz-solving agent. \
    The user message is the visible text of a quiz page. \
    Identify the question, solve it, and find the URL the answer must be \
    submitted to (it is stated somewhere in the page text). \
    Respond with a bare JSON object containing exactly two keys: \
    \"answer\" (the solved value) and \"submit_url\" (the submission URL as a string). \
    Do not wrap the JSON in markdown code fences. Do not add any commentary.";

/// 答案推导能力
#[async_trait]
pub trait AnswerDeriver: Send + Sync {
    /// 从页面文本推导答案与提交地址
    async fn derive(&self, page_text: &str) -> SolveResult<DerivedAnswer>;
}

/// 基于 LLM 的答案推导器
///
/// 职责：
/// - 把一页测验文本变成结构化答案
/// - 每轮恰好调用一次 LLM，失败不重试
/// - 不关心轮次，也不关心流程顺序
pub struct LlmDeriver {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl LlmDeriver {
    /// 创建新的答案推导器
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
        }
    }

    /// 调用 LLM API，返回原始文本输出
    async fn send_to_llm(&self, user_message: &str) -> SolveResult<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        // 构建消息列表
        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(SYSTEM_PROMPT)
            .build()
            .map_err(|e| SolveError::llm(&self.model_name, e))?;
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(|e| SolveError::llm(&self.model_name, e))?;

        let messages = vec![
            ChatCompletionRequestMessage::System(system_msg),
            ChatCompletionRequestMessage::User(user_msg),
        ];

        // 构建请求
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.3)
            .max_tokens(1024u32)
            .build()
            .map_err(|e| SolveError::llm(&self.model_name, e))?;

        // 调用 API
        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            SolveError::llm(&self.model_name, e)
        })?;

        debug!("LLM API 调用成功");

        // 提取响应内容；空内容留给 JSON 解析环节判错
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();
        if content.is_empty() {
            warn!("LLM 返回内容为空 (模型: {})", self.model_name);
        }

        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl AnswerDeriver for LlmDeriver {
    async fn derive(&self, page_text: &str) -> SolveResult<DerivedAnswer> {
        let user_message = format!("Quiz page text:\n\n{}", page_text);
        let raw = self.send_to_llm(&user_message).await?;
        debug!("🤖 LLM 原始输出: {}", truncate_text(&raw, 300));
        parse_derived_answer(&raw)
    }
}

// ========== 输出解析 ==========

/// 剥掉模型输出外层的 Markdown 代码围栏
///
/// 处理优先级: ```json 标记围栏 > 无标记围栏 > 原文。
/// 对任意输入都返回可供解析的文本，本身不会失败。
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|x| x.trim())
        .unwrap_or(trimmed);
    unfenced
        .strip_suffix("```")
        .map(|x| x.trim())
        .unwrap_or(unfenced)
}

/// 解析模型输出为结构化答案
///
/// 清理围栏后必须是合法 JSON；`submit_url` 缺失或为空串按缺字段处理；
/// `answer` 缺失时以 null 原样转发，内容不做语义校验。
pub fn parse_derived_answer(raw: &str) -> SolveResult<DerivedAnswer> {
    let cleaned = strip_code_fence(raw);
    let value: Value = serde_json::from_str(cleaned).map_err(|e| SolveError::parse(cleaned, e))?;

    let submit_url = value
        .get("submit_url")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .unwrap_or("")
        .to_string();
    if submit_url.is_empty() {
        return Err(SolveError::MissingField {
            field: "submit_url",
        });
    }

    let answer = value.get("answer").cloned().unwrap_or(Value::Null);

    Ok(DerivedAnswer { answer, submit_url })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BARE: &str = r#"{"answer": 42, "submit_url": "https://q.test/submit"}"#;

    #[test]
    fn test_strip_code_fence_tagged() {
        let raw = format!("```json\n{}\n```", BARE);
        assert_eq!(strip_code_fence(&raw), BARE);
    }

    #[test]
    fn test_strip_code_fence_untagged() {
        let raw = format!("```\n{}\n```", BARE);
        assert_eq!(strip_code_fence(&raw), BARE);
    }

    #[test]
    fn test_strip_code_fence_raw_passthrough() {
        assert_eq!(strip_code_fence(BARE), BARE);
        assert_eq!(strip_code_fence("  \n{}\n  "), "{}");
    }

    #[test]
    fn test_fence_variants_parse_identically() {
        let tagged = format!("```json\n{}\n```", BARE);
        let untagged = format!("```\n{}\n```", BARE);
        let a = parse_derived_answer(&tagged).unwrap();
        let b = parse_derived_answer(&untagged).unwrap();
        let c = parse_derived_answer(BARE).unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(c.submit_url, "https://q.test/submit");
        assert_eq!(c.answer, json!(42));
    }

    #[test]
    fn test_non_json_output_is_parse_error() {
        let err = parse_derived_answer("答案是 42，提交到 https://q.test/submit").unwrap_err();
        assert!(matches!(err, SolveError::Parse { .. }));
    }

    #[test]
    fn test_missing_submit_url_is_missing_field() {
        let err = parse_derived_answer(r#"{"answer": 42}"#).unwrap_err();
        assert!(matches!(
            err,
            SolveError::MissingField {
                field: "submit_url"
            }
        ));
    }

    #[test]
    fn test_empty_submit_url_is_missing_field() {
        let err = parse_derived_answer(r#"{"answer": 42, "submit_url": ""}"#).unwrap_err();
        assert!(matches!(err, SolveError::MissingField { .. }));

        let err = parse_derived_answer(r#"{"answer": 42, "submit_url": "   "}"#).unwrap_err();
        assert!(matches!(err, SolveError::MissingField { .. }));
    }

    #[test]
    fn test_missing_answer_defaults_to_null() {
        let derived =
            parse_derived_answer(r#"{"submit_url": "https://q.test/submit"}"#).unwrap();
        assert_eq!(derived.answer, Value::Null);
    }

    #[test]
    fn test_structured_answer_forwarded_untouched() {
        let raw = r#"{"answer": {"choices": ["A", "C"]}, "submit_url": "https://q.test/submit"}"#;
        let derived = parse_derived_answer(raw).unwrap();
        assert_eq!(derived.answer, json!({"choices": ["A", "C"]}));
    }

    /// 测试真实 LLM 推导
    ///
    /// 运行方式：
    /// ```bash
    /// LLM_API_KEY=... cargo test test_derive_real_llm -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_derive_real_llm() {
        let _ = tracing_subscriber::fmt::try_init();

        let config = Config::from_env();
        let deriver = LlmDeriver::new(&config);

        let page_text = "Question: What is 2 + 40?\n\
                         Post your answer as JSON to https://quiz.example.com/api/answer";

        println!("\n========== 测试 LLM 推导 ==========");
        let result = deriver.derive(page_text).await;

        match result {
            Ok(derived) => {
                println!("✅ 推导成功: answer={}, submit_url={}", derived.answer, derived.submit_url);
                assert!(!derived.submit_url.is_empty());
            }
            Err(e) => {
                println!("❌ 推导失败: {}", e);
                panic!("测试失败: {}", e);
            }
        }
    }
}
