//! 浏览器基础设施

pub mod headless;
pub mod identity;

pub use headless::launch_headless_browser;
pub use identity::{user_agent_for, DEFAULT_IDENTITY, USER_AGENTS};
