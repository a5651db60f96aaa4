//! # Quiz Chain Solver
//!
//! 一个由 webhook 触发、自动求解测验链的 Rust 服务
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Browser）
//! - `browser/` - 无头浏览器的启动与身份档案，只暴露能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个能力一个 trait，可注入假实现
//! - `PageRenderer` - 页面 → 可见文本
//! - `AnswerDeriver` - 页面文本 → 结构化答案
//! - `AnswerSubmitter` - 答案 → 判定结果
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次运行"的轮次状态机
//! - `QuizRunner` - 渲染 → 推导 → 提交 的编排与状态转移
//!
//! ### ④ 接入层（Server）
//! - `server/` - webhook 门面：受理、确认、后台分离求解
//! - `RunRegistry` - 运行状态快照的内存注册表
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod server;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{ApiError, SolveError, SolveResult};
pub use models::{
    AnswerPayload, DerivedAnswer, QuizTask, RunState, RunStatus, SubmissionResult,
};
pub use server::{AppState, RunRegistry};
pub use services::{
    AnswerDeriver, AnswerSubmitter, ChromeRenderer, HttpSubmitter, LlmDeriver, PageRenderer,
};
pub use workflow::{run_quiz_task, QuizRunner};
