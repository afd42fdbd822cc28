// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::scrape_job::ScrapeJobResult;
use crate::domain::models::scrape_target::ScrapeTarget;
use crate::domain::repositories::address_repository::AddressRepository;
use crate::domain::repositories::scrape_job_repository::ScrapeJobRepository;
use crate::queue::scheduler::SeedScheduler;
use crate::workers::orchestrator::{ScrapeConfig, ScrapeOrchestrator};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

/// 工作管理器
///
/// 以有界并发执行作业，作业之间除存储外不共享可变状态。
pub struct WorkerManager<A, J>
where
    A: AddressRepository + 'static,
    J: ScrapeJobRepository + 'static,
{
    orchestrator: Arc<ScrapeOrchestrator<A, J>>,
    config: ScrapeConfig,
    permits: Arc<Semaphore>,
    handles: Vec<JoinHandle<()>>,
}

impl<A, J> WorkerManager<A, J>
where
    A: AddressRepository + 'static,
    J: ScrapeJobRepository + 'static,
{
    pub fn new(
        orchestrator: Arc<ScrapeOrchestrator<A, J>>,
        config: ScrapeConfig,
        concurrency: usize,
    ) -> Self {
        Self {
            orchestrator,
            config,
            permits: Arc::new(Semaphore::new(concurrency.max(1))),
            handles: Vec::new(),
        }
    }

    /// 并发执行一批作业
    ///
    /// 结果按完成顺序返回。单个作业的硬超时由编排器保证。
    pub async fn run_batch(&self, targets: Vec<ScrapeTarget>) -> Vec<ScrapeJobResult> {
        Self::execute(
            self.orchestrator.clone(),
            self.config.clone(),
            self.permits.clone(),
            targets,
        )
        .await
    }

    async fn execute(
        orchestrator: Arc<ScrapeOrchestrator<A, J>>,
        config: ScrapeConfig,
        permits: Arc<Semaphore>,
        targets: Vec<ScrapeTarget>,
    ) -> Vec<ScrapeJobResult> {
        let mut set = JoinSet::new();

        for target in targets {
            let orchestrator = orchestrator.clone();
            let config = config.clone();
            let permits = permits.clone();
            set.spawn(async move {
                let _permit = permits.acquire_owned().await.ok()?;
                Some(orchestrator.run_job(target, &config).await)
            });
        }

        let mut results = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(Some(result)) => results.push(result),
                Ok(None) => error!("Worker pool closed before job could start"),
                Err(e) => error!("Scrape job task aborted: {}", e),
            }
        }
        results
    }

    /// 启动种子调度循环
    ///
    /// 每个周期取出到期目标并执行，完成后记录运行状态。
    pub fn start_scheduler(&mut self, scheduler: Arc<SeedScheduler>, tick: Duration) {
        let orchestrator = self.orchestrator.clone();
        let config = self.config.clone();
        let permits = self.permits.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = interval(tick);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;

                let targets = scheduler.due_targets(Utc::now());
                if targets.is_empty() {
                    continue;
                }

                info!(count = targets.len(), "Running due seeds");
                let results = Self::execute(
                    orchestrator.clone(),
                    config.clone(),
                    permits.clone(),
                    targets,
                )
                .await;

                let failed = results.iter().filter(|r| !r.is_success()).count();
                for result in &results {
                    scheduler.record_run(result);
                }
                info!(completed = results.len() - failed, failed, "Scheduler tick finished");
            }
        });

        self.handles.push(handle);
    }

    /// 等待关闭信号并关闭工作进程
    ///
    /// 监听关闭信号并停止调度循环
    pub async fn wait_for_shutdown(&mut self) {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(err) => error!("Unable to listen for shutdown signal: {}", err),
        }

        self.shutdown();
    }

    /// 停止所有后台任务
    pub fn shutdown(&mut self) {
        info!("Shutting down workers...");
        for handle in self.handles.drain(..) {
            handle.abort();
        }
        info!("Workers shut down successfully");
    }
}
