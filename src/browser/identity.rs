//! 浏览器身份档案
//!
//! 渲染时统一使用固定、真实的 User-Agent，避免站点把无头浏览器
//! 当成爬虫而返回精简页面。

use tracing::warn;

/// 默认身份档案名
pub const DEFAULT_IDENTITY: &str = "chrome-linux";

const CHROME_LINUX_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

/// 身份档案名 → User-Agent
pub static USER_AGENTS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "chrome-linux" => CHROME_LINUX_UA,
    "chrome-windows" => "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    "chrome-macos" => "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    "edge-windows" => "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36 Edg/126.0.0.0",
};

/// 查找身份档案对应的 User-Agent，未知档案名回退到默认值
pub fn user_agent_for(identity: &str) -> &'static str {
    match USER_AGENTS.get(identity).copied() {
        Some(ua) => ua,
        None => {
            warn!("⚠️ 未知的浏览器身份: {}, 回退到 {}", identity, DEFAULT_IDENTITY);
            CHROME_LINUX_UA
        }
    }
}
