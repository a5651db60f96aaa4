//! 通用工具

pub mod logging;
pub mod text;

pub use logging::{log_startup, truncate_text};
pub use text::collapse_blank_lines;
