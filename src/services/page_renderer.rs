//! 页面渲染服务 - 业务能力层
//!
//! 只负责"URL → 可见正文文本"能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `chromiumoxide` 驱动无头 Chrome（CDP）
//! - 等待 networkIdle 生命周期事件，确保动态加载的题目渲染完成

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::LoaderId;
use chromiumoxide::cdp::browser_protocol::page::{EventLifecycleEvent, NavigateParams};
use chromiumoxide::Browser;
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::browser::{launch_headless_browser, user_agent_for};
use crate::config::Config;
use crate::error::{SolveError, SolveResult};
use crate::utils::collapse_blank_lines;

/// 页面渲染能力
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// 渲染页面并返回可见正文文本
    async fn render(&self, url: &str) -> SolveResult<String>;
}

/// 正在复用的浏览器会话
struct BrowserSession {
    browser: Browser,
    event_task: JoinHandle<()>,
}

/// 基于无头 Chrome 的页面渲染器
///
/// 职责：
/// - 首次渲染时按需启动浏览器，同一次运行内复用
/// - 每轮新开页面，网络空闲后取 `document.body.innerText`
/// - 不缓存页面内容，失败不重试
///
/// 一个渲染器只服务一次运行，运行结束后调用 [`ChromeRenderer::shutdown`]。
pub struct ChromeRenderer {
    user_agent: &'static str,
    timeout: Duration,
    session: Mutex<Option<BrowserSession>>,
}

impl ChromeRenderer {
    pub fn new(config: &Config) -> Self {
        Self {
            user_agent: user_agent_for(&config.browser_identity),
            timeout: Duration::from_secs(config.render_timeout_secs),
            session: Mutex::new(None),
        }
    }

    async fn render_inner(&self, url: &str) -> SolveResult<String> {
        let mut guard = self.session.lock().await;
        let session = match guard.take() {
            Some(session) => guard.insert(session),
            None => {
                let (browser, event_task) = launch_headless_browser(self.user_agent)
                    .await
                    .map_err(|e| SolveError::render(url, e))?;
                guard.insert(BrowserSession {
                    browser,
                    event_task,
                })
            }
        };

        let page = session
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| SolveError::render(url, e))?;

        // 先订阅生命周期事件再导航，避免错过 networkIdle
        let mut lifecycle = page
            .event_listener::<EventLifecycleEvent>()
            .await
            .map_err(|e| SolveError::render(url, e))?;

        // 手动下发导航命令以拿到本次加载的 loader_id
        let nav = page
            .execute(NavigateParams::from(url))
            .await
            .map_err(|e| SolveError::render(url, e))?;
        if let Some(err) = nav.result.error_text {
            return Err(SolveError::render(url, err));
        }
        let loader_id = nav.result.loader_id;

        page.wait_for_navigation()
            .await
            .map_err(|e| SolveError::render(url, e))?;

        // 等到本次加载网络空闲，动态插入的内容才算渲染完。
        // about:blank 残留在事件流里的 networkIdle 按 loader 过滤掉；
        // 事件迟迟不来时由外层超时兜底。
        while let Some(event) = lifecycle.next().await {
            if is_network_idle_for(&event, loader_id.as_ref()) {
                break;
            }
        }

        let text: String = page
            .evaluate("document.body ? document.body.innerText : ''")
            .await
            .map_err(|e| SolveError::render(url, e))?
            .into_value()
            .map_err(|e| SolveError::render(url, e))?;

        if let Err(e) = page.close().await {
            warn!("⚠️ 关闭页面失败: {}", e);
        }

        debug!("✓ 页面渲染完成: {} ({} 字符)", url, text.chars().count());
        Ok(collapse_blank_lines(&text))
    }

    /// 关闭浏览器会话（运行结束时调用一次）
    pub async fn shutdown(&self) {
        let mut guard = self.session.lock().await;
        if let Some(mut session) = guard.take() {
            if let Err(e) = session.browser.close().await {
                warn!("⚠️ 关闭浏览器失败: {}", e);
            }
            let _ = session.browser.wait().await;
            session.event_task.abort();
            debug!("无头浏览器已关闭");
        }
    }
}

/// 判断生命周期事件是否是本次加载的 networkIdle
///
/// 订阅先于导航，事件流里可能缓存着 about:blank 那次加载的
/// networkIdle，只认 loader 匹配的事件；导航未返回 loader
/// （同文档导航）时退回只看事件名。
fn is_network_idle_for(event: &EventLifecycleEvent, loader_id: Option<&LoaderId>) -> bool {
    event.name == "networkIdle" && loader_id.map_or(true, |id| event.loader_id == *id)
}

#[async_trait]
impl PageRenderer for ChromeRenderer {
    async fn render(&self, url: &str) -> SolveResult<String> {
        debug!("🔍 渲染页面: {}", url);
        match tokio::time::timeout(self.timeout, self.render_inner(url)).await {
            Ok(result) => result,
            Err(elapsed) => Err(SolveError::render(url, elapsed)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chromiumoxide::cdp::browser_protocol::network::MonotonicTime;
    use chromiumoxide::cdp::browser_protocol::page::FrameId;

    fn lifecycle(name: &str, loader: &str) -> EventLifecycleEvent {
        EventLifecycleEvent {
            frame_id: FrameId::new("frame-1"),
            loader_id: LoaderId::new(loader),
            name: name.to_string(),
            timestamp: MonotonicTime::new(0.0),
        }
    }

    #[test]
    fn test_network_idle_matching_loader_accepted() {
        let target = LoaderId::new("loader-goto");
        let event = lifecycle("networkIdle", "loader-goto");
        assert!(is_network_idle_for(&event, Some(&target)));
    }

    #[test]
    fn test_stale_blank_page_network_idle_rejected() {
        // 订阅先于导航：about:blank 那次加载的 networkIdle 可能已在
        // 事件流里排队，不能拿它当目标页加载完成
        let target = LoaderId::new("loader-goto");
        let stale = lifecycle("networkIdle", "loader-blank");
        assert!(!is_network_idle_for(&stale, Some(&target)));
    }

    #[test]
    fn test_other_lifecycle_events_ignored() {
        let target = LoaderId::new("loader-goto");
        for name in ["init", "load", "DOMContentLoaded", "networkAlmostIdle"] {
            let event = lifecycle(name, "loader-goto");
            assert!(!is_network_idle_for(&event, Some(&target)));
        }
    }

    #[test]
    fn test_missing_loader_falls_back_to_name_only() {
        let event = lifecycle("networkIdle", "loader-any");
        assert!(is_network_idle_for(&event, None));
        assert!(!is_network_idle_for(&lifecycle("load", "loader-any"), None));
    }

    /// 测试真实页面渲染
    ///
    /// 运行方式：
    /// ```bash
    /// cargo test test_render_real_page -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_render_real_page() {
        let _ = tracing_subscriber::fmt::try_init();

        let config = Config::from_env();
        let renderer = ChromeRenderer::new(&config);

        println!("\n========== 测试页面渲染 ==========");
        let result = renderer.render("https://example.com").await;
        renderer.shutdown().await;

        match result {
            Ok(text) => {
                println!("✅ 渲染成功，{} 字符", text.chars().count());
                println!("{}", text);
                assert!(text.contains("Example Domain"));
            }
            Err(e) => {
                println!("❌ 渲染失败: {}", e);
                panic!("测试失败: {}", e);
            }
        }
    }

    /// 测试不可达地址在超时内报渲染错误
    #[tokio::test]
    #[ignore]
    async fn test_render_unreachable_url() {
        let config = Config {
            render_timeout_secs: 15,
            ..Config::default()
        };
        let renderer = ChromeRenderer::new(&config);

        let result = renderer.render("http://127.0.0.1:1/nope").await;
        renderer.shutdown().await;

        assert!(matches!(result, Err(SolveError::Render { .. })));
    }
}
