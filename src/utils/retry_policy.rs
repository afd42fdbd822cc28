// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

/// 重试策略配置
///
/// `max_retries` 为总尝试次数上限；第 `attempt` 次（从 0 开始）失败后的
/// 等待时间为 `initial_backoff * backoff_multiplier^attempt`。
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 最大尝试次数
    pub max_retries: u32,
    /// 初始退避时间
    pub initial_backoff: Duration,
    /// 最大退避时间，`None` 表示不设上限
    pub max_backoff: Option<Duration>,
    /// 退避乘数
    pub backoff_multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::exponential(3, Duration::from_secs(1))
    }
}

impl RetryPolicy {
    /// 创建指数退避策略（`delay = unit * 2^attempt`）
    ///
    /// 尝试次数至少为 1。
    pub fn exponential(max_retries: u32, unit: Duration) -> Self {
        Self {
            max_retries: max_retries.max(1),
            initial_backoff: unit,
            max_backoff: None,
            backoff_multiplier: 2,
        }
    }

    /// 设置最大退避时间
    pub fn with_max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff = Some(max_backoff);
        self
    }

    /// 计算第 `attempt` 次失败后的退避时间
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.saturating_pow(attempt);
        let backoff = self.initial_backoff.saturating_mul(factor);

        match self.max_backoff {
            Some(max) => backoff.min(max),
            None => backoff,
        }
    }

    /// 第 `attempt` 次失败后是否还有剩余尝试
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt.saturating_add(1) < self.max_retries
    }

    /// 完整重试序列的退避时间表
    pub fn schedule(&self) -> Vec<Duration> {
        (0..self.max_retries.saturating_sub(1))
            .map(|attempt| self.calculate_backoff(attempt))
            .collect()
    }
}
