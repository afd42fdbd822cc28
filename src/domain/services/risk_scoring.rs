// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::address::ExtractedAddress;
use crate::domain::models::scrape_job::DomainError;
use crate::domain::models::scrape_target::{NetworkLayer, ScrapeTarget};

/// 风险评分特质
///
/// 新地址入库时给出初始风险分 (0-100)，外部评分服务可替换默认实现。
pub trait RiskScorer: Send + Sync {
    fn score(&self, address: &ExtractedAddress, source: &ScrapeTarget) -> u8;
}

/// 默认风险评分策略
///
/// 明网来源取区间中点，Tor / I2P 来源取区间上限。结果只依赖来源网络层。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultRiskScorer {
    low: u8,
    high: u8,
}

impl DefaultRiskScorer {
    /// 创建评分策略，要求 `low <= high <= 100`
    pub fn new(low: u8, high: u8) -> Result<Self, DomainError> {
        if low > high || high > 100 {
            return Err(DomainError::ValidationError(format!(
                "invalid risk score range [{}, {}]",
                low, high
            )));
        }
        Ok(Self { low, high })
    }
}

impl Default for DefaultRiskScorer {
    fn default() -> Self {
        Self { low: 30, high: 70 }
    }
}

impl RiskScorer for DefaultRiskScorer {
    fn score(&self, _address: &ExtractedAddress, source: &ScrapeTarget) -> u8 {
        match source.network_layer() {
            NetworkLayer::Surface => self.low + (self.high - self.low) / 2,
            NetworkLayer::Tor | NetworkLayer::I2p => self.high,
        }
    }
}
