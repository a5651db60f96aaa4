pub mod quiz_runner;

pub use quiz_runner::{run_quiz_task, QuizRunner};
