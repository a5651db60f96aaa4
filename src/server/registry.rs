//! 运行注册表
//!
//! webhook 返回确认后运行在后台继续，注册表保存每次运行的最新
//! 状态快照，供 `GET /runs/{id}` 诊断查询。只存内存，重启即失。

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::models::RunState;

/// 一次运行的注册记录
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub run_id: String,
    pub email: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub state: RunState,
}

/// 内存运行注册表
#[derive(Default)]
pub struct RunRegistry {
    runs: Mutex<HashMap<String, RunRecord>>,
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一次新运行（初始为 Running 状态）
    pub async fn register(&self, run_id: &str, email: &str, start_url: &str) {
        let record = RunRecord {
            run_id: run_id.to_string(),
            email: email.to_string(),
            started_at: Utc::now(),
            finished_at: None,
            state: RunState::new(start_url),
        };
        self.runs.lock().await.insert(run_id.to_string(), record);
    }

    /// 回填终态
    pub async fn complete(&self, run_id: &str, state: RunState) {
        if let Some(record) = self.runs.lock().await.get_mut(run_id) {
            record.state = state;
            record.finished_at = Some(Utc::now());
        }
    }

    /// 查询运行快照
    pub async fn snapshot(&self, run_id: &str) -> Option<RunRecord> {
        self.runs.lock().await.get(run_id).cloned()
    }
}
