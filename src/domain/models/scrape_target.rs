// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::scrape_job::DomainError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// 网络层枚举
///
/// 决定抓取请求走哪条传输路由：明网直连、Tor SOCKS5 代理或 I2P HTTP 代理。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NetworkLayer {
    /// 明网，直接通过公网访问
    #[default]
    Surface,
    /// Tor 网络（`.onion`）
    Tor,
    /// I2P 网络（`.i2p`）
    I2p,
}

impl NetworkLayer {
    /// 根据主机名后缀推断网络层
    pub fn from_host(host: &str) -> Self {
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        if host.ends_with(".onion") {
            NetworkLayer::Tor
        } else if host.ends_with(".i2p") {
            NetworkLayer::I2p
        } else {
            NetworkLayer::Surface
        }
    }
}

impl fmt::Display for NetworkLayer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NetworkLayer::Surface => write!(f, "surface"),
            NetworkLayer::Tor => write!(f, "tor"),
            NetworkLayer::I2p => write!(f, "i2p"),
        }
    }
}

impl FromStr for NetworkLayer {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "surface" => Ok(NetworkLayer::Surface),
            "tor" => Ok(NetworkLayer::Tor),
            "i2p" => Ok(NetworkLayer::I2p),
            _ => Err(()),
        }
    }
}

/// 抓取目标
///
/// 作业的不可变输入快照。构造时即校验 URL，格式错误的目标不会进入流水线。
/// 字段只读，作业持有的是自己的副本而非外部种子配置的引用。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrapeTarget {
    url: String,
    display_name: String,
    network_layer: NetworkLayer,
    requires_proxy: bool,
}

impl ScrapeTarget {
    /// 创建抓取目标
    ///
    /// 网络层由主机名后缀推断；`display_name` 为空时使用主机名。
    ///
    /// # 参数
    ///
    /// * `url` - 目标URL，必须是 http 或 https
    /// * `display_name` - 展示名称
    ///
    /// # 返回值
    ///
    /// * `Ok(ScrapeTarget)` - 校验通过的目标
    /// * `Err(DomainError)` - URL 无效
    pub fn new(url: impl Into<String>, display_name: impl Into<String>) -> Result<Self, DomainError> {
        let url = url.into();
        let parsed = Url::parse(url.trim())
            .map_err(|e| DomainError::ValidationError(format!("invalid url '{}': {}", url, e)))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(DomainError::ValidationError(format!(
                "unsupported scheme '{}' in '{}'",
                parsed.scheme(),
                url
            )));
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| DomainError::ValidationError(format!("missing host in '{}'", url)))?
            .to_string();

        let network_layer = NetworkLayer::from_host(&host);
        let display_name = display_name.into();
        let display_name = if display_name.trim().is_empty() {
            host
        } else {
            display_name.trim().to_string()
        };

        Ok(Self {
            url: parsed.to_string(),
            display_name,
            network_layer,
            requires_proxy: network_layer != NetworkLayer::Surface,
        })
    }

    /// 显式覆盖网络层
    pub fn with_network_layer(mut self, layer: NetworkLayer) -> Self {
        self.network_layer = layer;
        self.requires_proxy = self.requires_proxy || layer != NetworkLayer::Surface;
        self
    }

    /// 强制走代理（种子的 deep_web 标记）
    ///
    /// 明网目标被标记后走 Tor 路由。
    pub fn with_requires_proxy(mut self, requires_proxy: bool) -> Self {
        self.requires_proxy = requires_proxy || self.network_layer != NetworkLayer::Surface;
        self
    }

    /// 从持久化字段重建目标
    pub fn from_parts(
        url: &str,
        display_name: &str,
        network_layer: NetworkLayer,
        requires_proxy: bool,
    ) -> Result<Self, DomainError> {
        Ok(Self::new(url, display_name)?
            .with_network_layer(network_layer)
            .with_requires_proxy(requires_proxy))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn network_layer(&self) -> NetworkLayer {
        self.network_layer
    }

    pub fn requires_proxy(&self) -> bool {
        self.requires_proxy
    }
}
