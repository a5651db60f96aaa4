//! HTTP 接入层
//!
//! webhook 门面: 受理任务后立即确认，求解在后台分离进行，
//! 结果只写入运行注册表，不再回传给触发方。

pub mod registry;
pub mod routes;

pub use registry::{RunRecord, RunRegistry};
pub use routes::{SolveAck, SolveRequest};

use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::models::QuizTask;
use crate::services::{HttpSubmitter, LlmDeriver};
use crate::utils::log_startup;
use crate::workflow::run_quiz_task;

/// 进程级共享状态
///
/// 推导器与提交器无状态，可被所有运行并发共享；
/// 浏览器不在此处，每次运行独占一个。
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub deriver: Arc<LlmDeriver>,
    pub submitter: Arc<HttpSubmitter>,
    pub registry: Arc<RunRegistry>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let deriver = Arc::new(LlmDeriver::new(&config));
        let submitter = Arc::new(HttpSubmitter::new(&config)?);
        Ok(Self {
            config: Arc::new(config),
            deriver,
            submitter,
            registry: Arc::new(RunRegistry::new()),
        })
    }

    /// 受理任务：登记运行并后台求解，立即返回运行 ID
    pub async fn spawn_run(&self, task: QuizTask) -> String {
        let run_id = Uuid::new_v4().to_string();
        self.registry
            .register(&run_id, &task.email, &task.start_url)
            .await;

        let config = Arc::clone(&self.config);
        let deriver = Arc::clone(&self.deriver);
        let submitter = Arc::clone(&self.submitter);
        let registry = Arc::clone(&self.registry);
        let id = run_id.clone();
        // 运行与本次 HTTP 请求解耦，结果只进注册表
        tokio::spawn(async move {
            let state = run_quiz_task(task, config, deriver, submitter).await;
            info!("[运行 {}] 📊 终态: {} (第 {} 轮)", id, state.status, state.round);
            registry.complete(&id, state).await;
        });

        run_id
    }
}

/// 启动 HTTP 服务（阻塞直到进程退出）
pub async fn run(config: Config) -> anyhow::Result<()> {
    log_startup(
        &config.bind_address,
        config.port,
        &config.browser_identity,
        config.max_rounds,
    );

    let bind = (config.bind_address.clone(), config.port);
    let state = AppState::new(config)?;

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .service(routes::home)
            .service(routes::solve_quiz)
            .service(routes::run_status)
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}
