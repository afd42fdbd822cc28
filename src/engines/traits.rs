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

use crate::domain::models::scrape_job::FailureKind;
use crate::domain::models::scrape_target::NetworkLayer;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// 抓取错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// 覆盖网络目标缺少代理配置
    #[error("{layer} proxy is not configured, refusing to reach {url} directly")]
    ProxyUnconfigured { layer: NetworkLayer, url: String },
    /// 代理地址无法解析
    #[error("invalid proxy endpoint '{endpoint}': {reason}")]
    InvalidProxy { endpoint: String, reason: String },
    /// 超时
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    /// 连接失败或读取响应失败
    #[error("connection failed: {0}")]
    Connection(String),
    /// 非2xx响应
    #[error("upstream responded with HTTP {status}")]
    Http { status: u16 },
}

impl FetchError {
    /// 错误分类
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::ProxyUnconfigured { .. } | FetchError::InvalidProxy { .. } => {
                FailureKind::Configuration
            }
            FetchError::Timeout(_) | FetchError::Connection(_) => FailureKind::Transient,
            FetchError::Http { .. } => FailureKind::Upstream,
        }
    }

    /// 判断错误是否可重试
    ///
    /// 配置错误不会因为重试而恢复，其余错误都会消耗重试预算。
    pub fn is_retryable(&self) -> bool {
        self.kind() != FailureKind::Configuration
    }
}

/// 单次抓取请求
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// 目标URL
    pub url: String,
    /// 单次尝试的超时时间
    pub timeout: Duration,
    /// 代理配置 (URL)
    pub proxy: Option<String>,
    /// 是否接受无效证书
    pub accept_invalid_certs: bool,
    /// User-Agent
    pub user_agent: String,
}

/// 单次抓取响应
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// HTTP状态码
    pub status_code: u16,
    /// 响应内容
    pub body: String,
    /// 内容类型
    pub content_type: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// HTTP传输层特质
///
/// 实现只负责执行一次请求，重试与路由由 `NetworkFetcher` 处理。
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// 执行单次请求
    async fn send(&self, request: &FetchRequest) -> Result<FetchResponse, FetchError>;

    /// 传输层名称
    fn name(&self) -> &'static str;
}
