// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::address::{AddressRecord, ExtractedAddress};
use crate::domain::models::scrape_target::ScrapeTarget;
use crate::domain::repositories::address_repository::{AddressRepository, RepositoryError};
use crate::domain::services::risk_scoring::RiskScorer;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// 跳过原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// 存储不可用或返回错误
    Store(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SkipReason::Store(msg) => write!(f, "store error: {}", msg),
        }
    }
}

/// 入库结果
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// 新建记录
    Inserted(AddressRecord),
    /// 已有记录，仅推进了 `last_seen`
    Updated(AddressRecord),
    /// 未写入
    Skipped(SkipReason),
}

impl IngestOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            IngestOutcome::Inserted(_) => "inserted",
            IngestOutcome::Updated(_) => "updated",
            IngestOutcome::Skipped(_) => "skipped",
        }
    }

    pub fn record(&self) -> Option<&AddressRecord> {
        match self {
            IngestOutcome::Inserted(record) | IngestOutcome::Updated(record) => Some(record),
            IngestOutcome::Skipped(_) => None,
        }
    }

    pub fn into_record(self) -> Option<AddressRecord> {
        match self {
            IngestOutcome::Inserted(record) | IngestOutcome::Updated(record) => Some(record),
            IngestOutcome::Skipped(_) => None,
        }
    }

    pub fn is_inserted(&self) -> bool {
        matches!(self, IngestOutcome::Inserted(_))
    }
}

/// 入库服务
///
/// 先按地址查找，不存在则带默认取证元数据插入，存在则只推进 `last_seen`。
/// 查找与插入之间并非原子操作，并发冲突由存储层唯一约束兜底：
/// `insert_if_absent` 返回 `false` 时按已存在处理。
pub struct Ingestor<A>
where
    A: AddressRepository,
{
    repository: Arc<A>,
    scorer: Arc<dyn RiskScorer>,
}

impl<A> Ingestor<A>
where
    A: AddressRepository,
{
    pub fn new(repository: Arc<A>, scorer: Arc<dyn RiskScorer>) -> Self {
        Self { repository, scorer }
    }

    /// 入库单个地址
    ///
    /// 存储错误不会向上传播，而是以 `Skipped` 返回。
    pub async fn ingest(&self, address: &ExtractedAddress, source: &ScrapeTarget) -> IngestOutcome {
        let outcome = match self.try_ingest(address, source).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(address = %address.address, error = %e, "Failed to ingest address");
                IngestOutcome::Skipped(SkipReason::Store(e.to_string()))
            }
        };

        metrics::counter!("coinsleuth_addresses_ingested_total", "outcome" => outcome.label())
            .increment(1);
        debug!(
            address = %address.address,
            currency = %address.currency,
            outcome = outcome.label(),
            "Ingested address"
        );

        outcome
    }

    async fn try_ingest(
        &self,
        address: &ExtractedAddress,
        source: &ScrapeTarget,
    ) -> Result<IngestOutcome, RepositoryError> {
        let now = Utc::now();

        if self
            .repository
            .find_by_address(&address.address)
            .await?
            .is_some()
        {
            return self.touch(&address.address, now).await;
        }

        let record = AddressRecord::discovered(
            address,
            source.url(),
            source.display_name(),
            &source.network_layer().to_string(),
            self.scorer.score(address, source),
            now,
        );

        if self.repository.insert_if_absent(&record).await? {
            return Ok(IngestOutcome::Inserted(record));
        }

        debug!(address = %address.address, "Concurrent insert detected, updating instead");
        self.touch(&address.address, now).await
    }

    async fn touch(
        &self,
        address: &str,
        now: DateTime<Utc>,
    ) -> Result<IngestOutcome, RepositoryError> {
        self.repository
            .touch_last_seen(address, now)
            .await?
            .map(IngestOutcome::Updated)
            .ok_or(RepositoryError::NotFound)
    }
}

#[cfg(test)]
#[path = "ingestor_test.rs"]
mod tests;
