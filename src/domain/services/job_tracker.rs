// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::scrape_job::{DomainError, FailureKind, JobStatus, ScrapeJob};
use crate::domain::models::scrape_target::ScrapeTarget;
use crate::domain::repositories::scrape_job_repository::ScrapeJobRepository;
use std::fmt;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// 作业状态跟踪器
///
/// 持有作业并在每次状态转换后保存。保存失败只记录日志，
/// 不影响作业本身的状态机。
pub struct JobTracker<J>
where
    J: ScrapeJobRepository,
{
    job: ScrapeJob,
    repository: Arc<J>,
}

impl<J> JobTracker<J>
where
    J: ScrapeJobRepository,
{
    /// 创建 Pending 作业并保存
    pub async fn create(target: ScrapeTarget, repository: Arc<J>) -> Self {
        let tracker = Self {
            job: ScrapeJob::new(target),
            repository,
        };
        tracker.persist().await;
        tracker
    }

    pub fn id(&self) -> Uuid {
        self.job.id
    }

    pub fn status(&self) -> JobStatus {
        self.job.status
    }

    /// 记录网络请求次数
    pub fn record_attempts(&mut self, attempts: u32) {
        self.job.fetch_attempts = attempts;
    }

    /// 记录已累计的地址计数，作业在中途失败时保留已完成的部分
    pub fn record_counts(&mut self, addresses_extracted: u32, addresses_new: u32) {
        self.job.addresses_extracted = addresses_extracted;
        self.job.addresses_new = addresses_new;
    }

    /// Pending -> Running
    pub async fn start(&mut self) -> Result<(), DomainError> {
        self.job.start()?;
        self.persist().await;
        Ok(())
    }

    /// Running -> Completed
    pub async fn complete(&mut self, addresses_extracted: u32, addresses_new: u32) -> Result<(), DomainError> {
        self.job.complete(addresses_extracted, addresses_new)?;
        self.persist().await;
        metrics::counter!("coinsleuth_jobs_total", "status" => "completed").increment(1);
        Ok(())
    }

    /// Pending | Running -> Failed
    pub async fn fail(&mut self, kind: FailureKind, error: impl fmt::Display) -> Result<(), DomainError> {
        self.job.fail(kind, error)?;
        self.persist().await;
        metrics::counter!("coinsleuth_jobs_total", "status" => "failed").increment(1);
        Ok(())
    }

    pub fn into_job(self) -> ScrapeJob {
        self.job
    }

    async fn persist(&self) {
        if let Err(e) = self.repository.save(&self.job).await {
            warn!(job_id = %self.job.id, status = %self.job.status, error = %e, "Failed to persist job");
        }
    }
}
