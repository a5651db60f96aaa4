pub mod answer_deriver;
pub mod answer_submitter;
pub mod page_renderer;

pub use answer_deriver::{AnswerDeriver, LlmDeriver};
pub use answer_submitter::{AnswerSubmitter, HttpSubmitter};
pub use page_renderer::{ChromeRenderer, PageRenderer};
