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

use crate::domain::models::scrape_target::ScrapeTarget;
use crate::domain::services::risk_scoring::DefaultRiskScorer;
use crate::engines::network_fetcher::{ProxyEndpoints, DEFAULT_USER_AGENT};
use crate::workers::orchestrator::ScrapeConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含数据库、抓取、代理、指标、调度和种子列表等所有配置项
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// 数据库配置
    pub database: DatabaseSettings,
    /// 抓取配置
    pub scraper: ScraperSettings,
    /// 代理配置
    #[serde(default)]
    pub proxy: ProxySettings,
    /// 指标配置
    pub metrics: MetricsSettings,
    /// 调度配置
    pub scheduler: SchedulerSettings,
    /// 种子列表
    #[serde(default)]
    pub seeds: Vec<SeedSettings>,
}

/// 数据库配置设置
#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
}

/// 抓取配置设置
#[derive(Debug, Deserialize)]
pub struct ScraperSettings {
    /// 单次请求基础超时（秒），代理路由加倍
    pub timeout_base_secs: u64,
    /// 最大尝试次数
    pub max_retries: u32,
    /// 退避时间单位（毫秒）
    pub backoff_unit_ms: u64,
    /// 单个作业的硬超时（秒）
    pub job_timeout_secs: u64,
    /// 默认风险分下限
    pub risk_score_low: u8,
    /// 默认风险分上限
    pub risk_score_high: u8,
    /// 并发作业数
    pub worker_concurrency: usize,
    /// User-Agent
    pub user_agent: String,
}

impl ScraperSettings {
    /// 构造作业配置，同时校验风险分区间
    pub fn scrape_config(&self) -> Result<ScrapeConfig, ConfigError> {
        DefaultRiskScorer::new(self.risk_score_low, self.risk_score_high)
            .map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(ScrapeConfig {
            timeout_base: Duration::from_secs(self.timeout_base_secs),
            max_retries: self.max_retries,
            default_risk_score_range: (self.risk_score_low, self.risk_score_high),
            job_timeout: Duration::from_secs(self.job_timeout_secs),
            backoff_unit: Duration::from_millis(self.backoff_unit_ms),
        })
    }
}

/// 代理配置设置
#[derive(Debug, Default, Deserialize)]
pub struct ProxySettings {
    /// Tor SOCKS5 端点（通常为 127.0.0.1:9050 或 9150）
    pub tor_socks: Option<String>,
    /// I2P HTTP 代理端点（通常为 127.0.0.1:4444）
    pub i2p_http: Option<String>,
}

impl ProxySettings {
    pub fn endpoints(&self) -> ProxyEndpoints {
        ProxyEndpoints::new(self.tor_socks.clone(), self.i2p_http.clone())
    }
}

/// 指标配置设置
#[derive(Debug, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用 Prometheus 导出
    pub enabled: bool,
    /// 监听地址
    pub listen_addr: String,
}

/// 调度配置设置
#[derive(Debug, Deserialize)]
pub struct SchedulerSettings {
    /// 调度检查间隔（秒）
    pub tick_secs: u64,
}

/// 种子抓取频率
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedFrequency {
    Hourly,
    #[default]
    Daily,
    Weekly,
}

impl SeedFrequency {
    pub fn interval(&self) -> chrono::Duration {
        match self {
            SeedFrequency::Hourly => chrono::Duration::hours(1),
            SeedFrequency::Daily => chrono::Duration::days(1),
            SeedFrequency::Weekly => chrono::Duration::weeks(1),
        }
    }
}

/// 种子配置
#[derive(Debug, Clone, Deserialize)]
pub struct SeedSettings {
    pub url: String,
    pub name: String,
    #[serde(default)]
    pub frequency: SeedFrequency,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 深网来源，即便是明网地址也强制走 Tor
    #[serde(default)]
    pub deep_web: bool,
}

fn default_true() -> bool {
    true
}

impl SeedSettings {
    /// 转换为抓取目标
    pub fn to_target(&self) -> Result<ScrapeTarget, ConfigError> {
        let target = ScrapeTarget::new(self.url.as_str(), self.name.as_str())
            .map_err(|e| ConfigError::Message(format!("seed '{}': {}", self.name, e)))?;
        Ok(if self.deep_web {
            target.with_requires_proxy(true)
        } else {
            target
        })
    }
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次叠加内置默认值、`config/default`、`config/{APP_ENVIRONMENT}`
    /// 和 `COINSLEUTH` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("COINSLEUTH").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// 在内置默认值之上叠加一段 TOML
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            // Default DB settings
            .set_default("database.url", "sqlite://coinsleuth.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            // Default scraper settings
            .set_default("scraper.timeout_base_secs", 15)?
            .set_default("scraper.max_retries", 3)?
            .set_default("scraper.backoff_unit_ms", 1000)?
            .set_default("scraper.job_timeout_secs", 300)?
            .set_default("scraper.risk_score_low", 30)?
            .set_default("scraper.risk_score_high", 70)?
            .set_default("scraper.worker_concurrency", 4)?
            .set_default("scraper.user_agent", DEFAULT_USER_AGENT)?
            // Default metrics settings
            .set_default("metrics.enabled", true)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")?
            // Default scheduler settings
            .set_default("scheduler.tick_secs", 60)
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
