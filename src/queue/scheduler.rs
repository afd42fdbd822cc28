// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::{SeedFrequency, SeedSettings};
use crate::domain::models::scrape_job::ScrapeJobResult;
use crate::domain::models::scrape_target::ScrapeTarget;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, warn};

/// 种子最近一次运行的状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedRunState {
    /// 最近运行时间
    pub last_run: DateTime<Utc>,
    /// 最近一次是否成功
    pub last_success: bool,
    /// 最近一次新入库的地址数
    pub last_addresses_new: u32,
    /// 累计运行次数
    pub runs: u64,
}

#[derive(Debug, Clone)]
struct ScheduledSeed {
    target: ScrapeTarget,
    frequency: SeedFrequency,
    enabled: bool,
}

/// 种子调度器
///
/// 按种子配置的频率决定哪些目标到期，运行状态以规范化后的目标URL为键。
/// 种子列表本身的增删不归调度器管理。
pub struct SeedScheduler {
    seeds: Vec<ScheduledSeed>,
    state: DashMap<String, SeedRunState>,
}

impl SeedScheduler {
    /// 创建调度器
    ///
    /// URL 无效的种子会被记录并跳过。
    pub fn new(seeds: &[SeedSettings]) -> Self {
        let seeds = seeds
            .iter()
            .filter_map(|seed| match seed.to_target() {
                Ok(target) => Some(ScheduledSeed {
                    target,
                    frequency: seed.frequency,
                    enabled: seed.enabled,
                }),
                Err(e) => {
                    warn!(seed = %seed.name, error = %e, "Skipping invalid seed");
                    None
                }
            })
            .collect();

        Self {
            seeds,
            state: DashMap::new(),
        }
    }

    /// 有效种子数量
    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }

    /// 到期的目标
    ///
    /// 已启用且从未运行过，或距上次运行已超过其频率间隔的种子。
    pub fn due_targets(&self, now: DateTime<Utc>) -> Vec<ScrapeTarget> {
        self.seeds
            .iter()
            .filter(|seed| seed.enabled)
            .filter(|seed| match self.state.get(seed.target.url()) {
                Some(state) => now - state.last_run >= seed.frequency.interval(),
                None => true,
            })
            .map(|seed| seed.target.clone())
            .collect()
    }

    /// 记录一次运行结果
    pub fn record_run(&self, result: &ScrapeJobResult) {
        let url = result.job.target.url().to_string();
        let last_run = result.job.completed_at.unwrap_or_else(Utc::now);

        let mut entry = self.state.entry(url.clone()).or_insert_with(|| SeedRunState {
            last_run,
            last_success: false,
            last_addresses_new: 0,
            runs: 0,
        });
        entry.last_run = last_run;
        entry.last_success = result.is_success();
        entry.last_addresses_new = result.job.addresses_new;
        entry.runs += 1;

        debug!(url = %url, runs = entry.runs, success = entry.last_success, "Recorded seed run");
    }

    /// 查询某个目标的运行状态
    pub fn run_state(&self, url: &str) -> Option<SeedRunState> {
        self.state.get(url).map(|state| state.clone())
    }
}
