/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use tracing::info;

/// 记录服务启动信息
///
/// # 参数
/// - `bind_address`: 监听地址
/// - `port`: 监听端口
/// - `browser_identity`: 浏览器身份档案名
/// - `max_rounds`: 单次运行最大轮数
pub fn log_startup(bind_address: &str, port: u16, browser_identity: &str, max_rounds: u32) {
    info!("{}", "=".repeat(60));
    info!("🚀 测验链求解服务启动");
    info!("📊 监听: {}:{}", bind_address, port);
    info!("📋 浏览器身份: {} / 最大轮数: {}", browser_identity, max_rounds);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_short_unchanged() {
        assert_eq!(truncate_text("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_text_long_gets_ellipsis() {
        assert_eq!(truncate_text("hello world", 5), "hello...");
    }

    #[test]
    fn test_truncate_text_multibyte_safe() {
        let text = "题目内容很长很长很长";
        let truncated = truncate_text(text, 4);
        assert_eq!(truncated, "题目内容...");
    }
}
