use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// 答题回合错误类型
///
/// 每一种都在回合边界被捕获: 记录日志后整次运行以失败结束, 不做任何重试。
#[derive(Debug)]
pub enum SolveError {
    /// 页面渲染失败（浏览器启动、导航、取文本或超时）
    Render {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// LLM API 调用失败
    Llm {
        model: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// LLM 输出不是合法 JSON
    Parse {
        snippet: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// LLM 输出缺少必需字段
    MissingField {
        field: &'static str,
    },
    /// 提交答案失败（网络错误或响应不是 JSON）
    Submit {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::Render { url, source } => {
                write!(f, "页面渲染失败 ({}): {}", url, source)
            }
            SolveError::Llm { model, source } => {
                write!(f, "LLM API调用失败 (模型: {}): {}", model, source)
            }
            SolveError::Parse { snippet, source } => {
                write!(f, "无法解析LLM返回的JSON: {} (内容: {})", source, snippet)
            }
            SolveError::MissingField { field } => {
                write!(f, "LLM返回缺少字段: {}", field)
            }
            SolveError::Submit { url, source } => {
                write!(f, "提交答案失败 ({}): {}", url, source)
            }
        }
    }
}

impl std::error::Error for SolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SolveError::Render { source, .. }
            | SolveError::Llm { source, .. }
            | SolveError::Parse { source, .. }
            | SolveError::Submit { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            SolveError::MissingField { .. } => None,
        }
    }
}

// ========== 便捷构造函数 ==========

impl SolveError {
    /// 创建页面渲染错误
    pub fn render(
        url: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        SolveError::Render {
            url: url.into(),
            source: source.into(),
        }
    }

    /// 创建 LLM API 调用错误
    pub fn llm(
        model: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        SolveError::Llm {
            model: model.into(),
            source: source.into(),
        }
    }

    /// 创建 JSON 解析错误（保留输出片段便于排查）
    pub fn parse(
        snippet: &str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        SolveError::Parse {
            snippet: snippet.chars().take(200).collect(),
            source: source.into(),
        }
    }

    /// 创建提交错误
    pub fn submit(
        url: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        SolveError::Submit {
            url: url.into(),
            source: source.into(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 答题流程结果类型
pub type SolveResult<T> = Result<T, SolveError>;

// ========== HTTP 接入层错误 ==========

/// Webhook 接口错误，直接映射为 HTTP 响应
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// 共享密钥校验失败
    #[error("Invalid secret")]
    InvalidSecret,
    /// 运行记录不存在
    #[error("Run not found: {0}")]
    RunNotFound(String),
}

/// 错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidSecret => StatusCode::FORBIDDEN,
            ApiError::RunNotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
            code: self.status_code().as_u16(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(ApiError::InvalidSecret.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::RunNotFound("abc".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_api_error_messages() {
        assert_eq!(ApiError::InvalidSecret.to_string(), "Invalid secret");
        assert_eq!(
            ApiError::RunNotFound("abc".to_string()).to_string(),
            "Run not found: abc"
        );
    }

    #[test]
    fn test_solve_error_display_carries_context() {
        let err = SolveError::render(
            "https://q.test/1",
            std::io::Error::new(std::io::ErrorKind::Other, "连接被拒绝"),
        );
        let text = err.to_string();
        assert!(text.contains("https://q.test/1"));
        assert!(text.contains("连接被拒绝"));
    }

    #[test]
    fn test_parse_snippet_truncated() {
        let long = "x".repeat(500);
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        if let SolveError::Parse { snippet, .. } = SolveError::parse(&long, json_err) {
            assert_eq!(snippet.chars().count(), 200);
        } else {
            panic!("expected Parse variant");
        }
    }

    #[test]
    fn test_missing_field_has_no_source() {
        use std::error::Error;
        let err = SolveError::MissingField {
            field: "submit_url",
        };
        assert!(err.source().is_none());
        assert!(err.to_string().contains("submit_url"));
    }
}
