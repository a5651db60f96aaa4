use serde::Deserialize;
use std::path::Path;

/// 单次运行默认的最大答题轮数
pub const DEFAULT_MAX_ROUNDS: u32 = 5;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP 服务监听地址
    pub bind_address: String,
    /// HTTP 服务监听端口
    pub port: u16,
    /// Webhook 共享密钥（校验入站请求，并随答案一起提交）
    pub webhook_secret: String,
    /// 浏览器身份档案名（决定 User-Agent）
    pub browser_identity: String,
    /// 单次页面渲染超时（秒）
    pub render_timeout_secs: u64,
    /// 答案提交请求超时（秒）
    pub submit_timeout_secs: u64,
    /// 单次运行最大答题轮数
    pub max_rounds: u32,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8000,
            webhook_secret: "tds_secret_key".to_string(),
            browser_identity: "chrome-linux".to_string(),
            render_timeout_secs: 60,
            submit_timeout_secs: 10,
            max_rounds: DEFAULT_MAX_ROUNDS,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            bind_address: std::env::var("BIND_ADDRESS").unwrap_or(default.bind_address),
            port: std::env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.port),
            webhook_secret: std::env::var("WEBHOOK_SECRET").unwrap_or(default.webhook_secret),
            browser_identity: std::env::var("BROWSER_IDENTITY").unwrap_or(default.browser_identity),
            render_timeout_secs: std::env::var("RENDER_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.render_timeout_secs),
            submit_timeout_secs: std::env::var("SUBMIT_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.submit_timeout_secs),
            max_rounds: std::env::var("MAX_ROUNDS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_rounds),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
        }
    }

    /// 从 TOML 配置文件读取，缺失字段回落到默认值
    pub fn from_toml_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// 加载配置: 存在 config.toml 时优先使用，否则读环境变量
    pub fn load() -> Self {
        let path = std::env::var("QUIZ_CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());
        if Path::new(&path).exists() {
            match Self::from_toml_file(&path) {
                Ok(config) => {
                    tracing::info!("📄 已加载配置文件: {}", path);
                    return config;
                }
                Err(e) => {
                    tracing::warn!("⚠️ 配置文件 {} 解析失败, 改用环境变量: {}", path, e);
                }
            }
        }
        Self::from_env()
    }
}
