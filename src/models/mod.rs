//! 数据模型

pub mod run;
pub mod task;

pub use run::{RunState, RunStatus};
pub use task::{AnswerPayload, DerivedAnswer, QuizTask, SubmissionResult};
