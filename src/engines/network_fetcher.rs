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

use crate::domain::models::scrape_target::{NetworkLayer, ScrapeTarget};
use crate::engines::traits::{FetchError, FetchRequest, HttpTransport};
use crate::utils::retry_policy::RetryPolicy;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// 默认 User-Agent
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; coinsleuth/0.1)";

/// 代理端点配置
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyEndpoints {
    /// Tor SOCKS5 端点，如 `127.0.0.1:9050`
    pub tor_socks: Option<String>,
    /// I2P HTTP 端点，如 `127.0.0.1:4444`
    pub i2p_http: Option<String>,
}

impl ProxyEndpoints {
    pub fn new(tor_socks: Option<String>, i2p_http: Option<String>) -> Self {
        Self {
            tor_socks: tor_socks.filter(|s| !s.trim().is_empty()),
            i2p_http: i2p_http.filter(|s| !s.trim().is_empty()),
        }
    }
}

/// 传输路由
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRoute {
    /// 直连
    Direct,
    /// 经 Tor SOCKS5 代理（远端解析域名）
    TorSocks(String),
    /// 经 I2P HTTP 代理
    I2pHttp(String),
}

impl FetchRoute {
    pub fn proxy_url(&self) -> Option<&str> {
        match self {
            FetchRoute::Direct => None,
            FetchRoute::TorSocks(url) | FetchRoute::I2pHttp(url) => Some(url),
        }
    }

    pub fn is_proxied(&self) -> bool {
        !matches!(self, FetchRoute::Direct)
    }

    /// 指标标签
    pub fn label(&self) -> &'static str {
        match self {
            FetchRoute::Direct => "surface",
            FetchRoute::TorSocks(_) => "tor",
            FetchRoute::I2pHttp(_) => "i2p",
        }
    }
}

/// 抓取到的原始内容
#[derive(Debug, Clone)]
pub struct RawContent {
    pub body: String,
    pub content_type: String,
    pub status_code: u16,
    /// 实际尝试次数（含成功的那次）
    pub attempts: u32,
    pub route: FetchRoute,
    pub elapsed_ms: u64,
}

/// 抓取失败
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{error} (after {attempts} attempt(s))")]
pub struct FetchFailure {
    /// 最后一次尝试的错误
    pub error: FetchError,
    /// 已进行的网络尝试次数；路由失败时为 0
    pub attempts: u32,
}

/// 网络抓取器
///
/// 负责把目标解析到正确的传输路由，并在可重试错误上执行指数退避。
/// 覆盖网络目标在缺少对应代理时直接失败，绝不回退到直连。
pub struct NetworkFetcher {
    transport: Arc<dyn HttpTransport>,
    proxies: ProxyEndpoints,
    backoff_unit: Duration,
    user_agent: String,
}

impl NetworkFetcher {
    pub fn new(transport: Arc<dyn HttpTransport>, proxies: ProxyEndpoints) -> Self {
        Self {
            transport,
            proxies,
            backoff_unit: Duration::from_secs(1),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn with_backoff_unit(mut self, backoff_unit: Duration) -> Self {
        self.backoff_unit = backoff_unit;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// 解析目标的传输路由
    ///
    /// * Tor 目标需要 `tor_socks`
    /// * I2P 目标需要 `i2p_http`
    /// * 标记了 `requires_proxy` 的明网目标走 Tor
    pub fn resolve_route(&self, target: &ScrapeTarget) -> Result<FetchRoute, FetchError> {
        let unconfigured = |layer| FetchError::ProxyUnconfigured {
            layer,
            url: target.url().to_string(),
        };

        match target.network_layer() {
            NetworkLayer::Tor => {
                let endpoint = self
                    .proxies
                    .tor_socks
                    .as_deref()
                    .ok_or_else(|| unconfigured(NetworkLayer::Tor))?;
                Ok(FetchRoute::TorSocks(normalize_endpoint(endpoint, "socks5h")?))
            }
            NetworkLayer::I2p => {
                let endpoint = self
                    .proxies
                    .i2p_http
                    .as_deref()
                    .ok_or_else(|| unconfigured(NetworkLayer::I2p))?;
                Ok(FetchRoute::I2pHttp(normalize_endpoint(endpoint, "http")?))
            }
            NetworkLayer::Surface if target.requires_proxy() => {
                let endpoint = self
                    .proxies
                    .tor_socks
                    .as_deref()
                    .ok_or_else(|| unconfigured(NetworkLayer::Tor))?;
                Ok(FetchRoute::TorSocks(normalize_endpoint(endpoint, "socks5h")?))
            }
            NetworkLayer::Surface => Ok(FetchRoute::Direct),
        }
    }

    /// 抓取目标内容
    ///
    /// # 参数
    ///
    /// * `target` - 抓取目标
    /// * `timeout_base` - 单次尝试的基础超时，代理路由加倍
    /// * `max_retries` - 总尝试次数上限，0 视为 1
    ///
    /// # 返回值
    ///
    /// * `Ok(RawContent)` - 2xx 响应
    /// * `Err(FetchFailure)` - 路由失败、不可重试错误或重试耗尽
    pub async fn fetch(
        &self,
        target: &ScrapeTarget,
        timeout_base: Duration,
        max_retries: u32,
    ) -> Result<RawContent, FetchFailure> {
        let policy = RetryPolicy::exponential(max_retries, self.backoff_unit);
        let mut attempts = 0;
        self.fetch_with_policy(target, timeout_base, &policy, &mut attempts)
            .await
    }

    /// 按指定重试策略抓取
    ///
    /// `attempts` 在每次发出请求前递增，调用方取消该 future 后仍能读到
    /// 已发出的请求数。
    pub async fn fetch_with_policy(
        &self,
        target: &ScrapeTarget,
        timeout_base: Duration,
        policy: &RetryPolicy,
        attempts: &mut u32,
    ) -> Result<RawContent, FetchFailure> {
        let route = self
            .resolve_route(target)
            .map_err(|error| FetchFailure { error, attempts: 0 })?;

        let timeout = if route.is_proxied() {
            timeout_base.saturating_mul(2)
        } else {
            timeout_base
        };

        let request = FetchRequest {
            url: target.url().to_string(),
            timeout,
            proxy: route.proxy_url().map(str::to_string),
            // Overlay services commonly present self-signed certificates
            accept_invalid_certs: route.is_proxied(),
            user_agent: self.user_agent.clone(),
        };

        let start = Instant::now();
        let mut attempt = 0u32;

        loop {
            *attempts = attempt + 1;
            metrics::counter!("coinsleuth_fetch_attempts_total", "layer" => route.label())
                .increment(1);

            let result = match self.transport.send(&request).await {
                Ok(response) if response.is_success() => Ok(response),
                Ok(response) => Err(FetchError::Http {
                    status: response.status_code,
                }),
                Err(error) => Err(error),
            };

            match result {
                Ok(response) => {
                    debug!(
                        url = target.url(),
                        route = route.label(),
                        transport = self.transport.name(),
                        attempts = *attempts,
                        status = response.status_code,
                        "Fetch succeeded"
                    );
                    return Ok(RawContent {
                        body: response.body,
                        content_type: response.content_type,
                        status_code: response.status_code,
                        attempts: *attempts,
                        route,
                        elapsed_ms: start.elapsed().as_millis() as u64,
                    });
                }
                Err(error) if error.is_retryable() && policy.should_retry(attempt) => {
                    let delay = policy.calculate_backoff(attempt);
                    warn!(
                        url = target.url(),
                        transport = self.transport.name(),
                        attempt = *attempts,
                        max_attempts = policy.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Fetch attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => {
                    warn!(
                        url = target.url(),
                        attempts = *attempts,
                        error = %error,
                        "Fetch failed"
                    );
                    return Err(FetchFailure {
                        error,
                        attempts: *attempts,
                    });
                }
            }
        }
    }
}

/// 为缺少协议的代理端点补全协议并校验
fn normalize_endpoint(endpoint: &str, default_scheme: &str) -> Result<String, FetchError> {
    let endpoint = endpoint.trim();
    let candidate = if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("{}://{}", default_scheme, endpoint)
    };

    let parsed = Url::parse(&candidate).map_err(|e| FetchError::InvalidProxy {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })?;

    if parsed.host_str().is_none() {
        return Err(FetchError::InvalidProxy {
            endpoint: endpoint.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(candidate)
}

#[cfg(test)]
#[path = "network_fetcher_test.rs"]
mod tests;
