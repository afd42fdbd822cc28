// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, Span};

use crate::domain::models::address::AddressRecord;
use crate::domain::models::scrape_job::{DomainError, FailureKind, ScrapeJobResult};
use crate::domain::models::scrape_target::ScrapeTarget;
use crate::domain::repositories::address_repository::AddressRepository;
use crate::domain::repositories::scrape_job_repository::ScrapeJobRepository;
use crate::domain::services::address_extractor::AddressExtractor;
use crate::domain::services::ingestor::Ingestor;
use crate::domain::services::job_tracker::JobTracker;
use crate::domain::services::risk_scoring::{DefaultRiskScorer, RiskScorer};
use crate::engines::network_fetcher::{FetchFailure, NetworkFetcher};
use crate::utils::retry_policy::RetryPolicy;

/// 作业配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeConfig {
    /// 单次请求基础超时
    pub timeout_base: Duration,
    /// 最大尝试次数
    pub max_retries: u32,
    /// 默认风险分区间 `[low, high]`
    pub default_risk_score_range: (u8, u8),
    /// 作业硬超时
    pub job_timeout: Duration,
    /// 退避时间单位
    pub backoff_unit: Duration,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            timeout_base: Duration::from_secs(15),
            max_retries: 3,
            default_risk_score_range: (30, 70),
            job_timeout: Duration::from_secs(300),
            backoff_unit: Duration::from_secs(1),
        }
    }
}

/// 作业执行过程中的累计状态
#[derive(Default)]
struct JobProgress {
    attempts: u32,
    extracted: u32,
    inserted: u32,
    records: Vec<AddressRecord>,
}

/// 抓取编排器
///
/// 驱动单个作业完成 抓取 -> 提取 -> 入库 -> 结束。
/// 任何路径都以作业进入终止状态并返回结果结束，不会向调用方抛出错误。
pub struct ScrapeOrchestrator<A, J>
where
    A: AddressRepository,
    J: ScrapeJobRepository,
{
    fetcher: Arc<NetworkFetcher>,
    extractor: AddressExtractor,
    address_repository: Arc<A>,
    job_repository: Arc<J>,
    scorer: Option<Arc<dyn RiskScorer>>,
}

impl<A, J> ScrapeOrchestrator<A, J>
where
    A: AddressRepository,
    J: ScrapeJobRepository,
{
    /// 创建新的编排器实例
    pub fn new(fetcher: Arc<NetworkFetcher>, address_repository: Arc<A>, job_repository: Arc<J>) -> Self {
        Self {
            fetcher,
            extractor: AddressExtractor::new(),
            address_repository,
            job_repository,
            scorer: None,
        }
    }

    /// 使用外部风险评分，替代按配置区间构造的默认策略
    pub fn with_scorer(mut self, scorer: Arc<dyn RiskScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    /// 执行一个抓取作业
    ///
    /// # 参数
    ///
    /// * `target` - 抓取目标
    /// * `config` - 作业配置
    ///
    /// # 返回值
    ///
    /// 作业最终快照及本次触及的地址记录
    #[instrument(
        skip(self, target, config),
        fields(job_id, url = %target.url(), layer = %target.network_layer())
    )]
    pub async fn run_job(&self, target: ScrapeTarget, config: &ScrapeConfig) -> ScrapeJobResult {
        let clock = Instant::now();
        let mut tracker = JobTracker::create(target.clone(), self.job_repository.clone()).await;
        Span::current().record("job_id", tracing::field::display(tracker.id()));

        // Configuration problems fail the job before it ever runs
        let scorer = match self.scorer(config) {
            Ok(scorer) => scorer,
            Err(message) => {
                error!(error = %message, "Invalid scrape configuration");
                Self::transition(tracker.fail(FailureKind::Configuration, message).await);
                return Self::finish(tracker, Vec::new(), clock);
            }
        };

        if let Err(e) = self.fetcher.resolve_route(&target) {
            error!(error = %e, "No usable route for target");
            Self::transition(tracker.fail(e.kind(), &e).await);
            return Self::finish(tracker, Vec::new(), clock);
        }

        Self::transition(tracker.start().await);
        info!("Scrape job started");

        let mut progress = JobProgress::default();
        let outcome = tokio::time::timeout(
            config.job_timeout,
            self.pipeline(&target, config, scorer, &mut progress),
        )
        .await;

        tracker.record_attempts(progress.attempts);
        match outcome {
            Ok(Ok(())) => {
                Self::transition(tracker.complete(progress.extracted, progress.inserted).await);
                info!(
                    addresses_extracted = progress.extracted,
                    addresses_new = progress.inserted,
                    attempts = progress.attempts,
                    "Scrape job completed"
                );
            }
            Ok(Err(failure)) => {
                tracker.record_attempts(failure.attempts);
                error!(error = %failure.error, attempts = failure.attempts, "Scrape job failed");
                Self::transition(tracker.fail(failure.error.kind(), &failure.error).await);
            }
            Err(_) => {
                tracker.record_counts(progress.extracted, progress.inserted);
                error!(
                    timeout_ms = config.job_timeout.as_millis() as u64,
                    addresses_extracted = progress.extracted,
                    addresses_new = progress.inserted,
                    "Scrape job timed out"
                );
                Self::transition(
                    tracker
                        .fail(
                            FailureKind::Timeout,
                            format!(
                                "no result within {:?} after {} fetch attempt(s)",
                                config.job_timeout, progress.attempts
                            ),
                        )
                        .await,
                );
            }
        }

        Self::finish(tracker, progress.records, clock)
    }

    async fn pipeline(
        &self,
        target: &ScrapeTarget,
        config: &ScrapeConfig,
        scorer: Arc<dyn RiskScorer>,
        progress: &mut JobProgress,
    ) -> Result<(), FetchFailure> {
        let policy = RetryPolicy::exponential(config.max_retries, config.backoff_unit);
        let content = self
            .fetcher
            .fetch_with_policy(target, config.timeout_base, &policy, &mut progress.attempts)
            .await?;

        // HTML parsing stays synchronous so the parsed document never crosses an await
        let extracted = self
            .extractor
            .extract_from_content(&content.body, &content.content_type);
        progress.extracted = extracted.len() as u32;
        debug!(
            route = content.route.label(),
            elapsed_ms = content.elapsed_ms,
            bytes = content.body.len(),
            addresses = extracted.len(),
            "Fetched and scanned content"
        );

        let ingestor = Ingestor::new(self.address_repository.clone(), scorer);
        for address in &extracted {
            let outcome = ingestor.ingest(address, target).await;
            if outcome.is_inserted() {
                progress.inserted += 1;
            }
            if let Some(record) = outcome.into_record() {
                progress.records.push(record);
            }
        }

        Ok(())
    }

    fn scorer(&self, config: &ScrapeConfig) -> Result<Arc<dyn RiskScorer>, String> {
        if let Some(scorer) = &self.scorer {
            return Ok(scorer.clone());
        }
        let (low, high) = config.default_risk_score_range;
        DefaultRiskScorer::new(low, high)
            .map(|scorer| Arc::new(scorer) as Arc<dyn RiskScorer>)
            .map_err(|e| e.to_string())
    }

    fn transition(result: Result<(), DomainError>) {
        if let Err(e) = result {
            error!(error = %e, "Unexpected job state transition");
        }
    }

    fn finish(tracker: JobTracker<J>, records: Vec<AddressRecord>, clock: Instant) -> ScrapeJobResult {
        metrics::histogram!("coinsleuth_job_duration_seconds").record(clock.elapsed().as_secs_f64());
        ScrapeJobResult {
            job: tracker.into_job(),
            records,
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
