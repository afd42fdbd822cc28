// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 默认分类，交由人工复核
pub const DEFAULT_CATEGORY: &str = "unknown";

/// 来源标签
pub const PROVENANCE_TAG: &str = "scraped";

/// 币种枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "BTC")]
    Bitcoin,
    #[serde(rename = "ETH")]
    Ethereum,
    #[serde(rename = "LTC")]
    Litecoin,
    #[serde(rename = "XRP")]
    Ripple,
    #[serde(rename = "DOGE")]
    Dogecoin,
}

impl Currency {
    /// 所有支持的币种
    pub const ALL: [Currency; 5] = [
        Currency::Bitcoin,
        Currency::Ethereum,
        Currency::Litecoin,
        Currency::Ripple,
        Currency::Dogecoin,
    ];

    /// 行情代码
    pub fn ticker(&self) -> &'static str {
        match self {
            Currency::Bitcoin => "BTC",
            Currency::Ethereum => "ETH",
            Currency::Litecoin => "LTC",
            Currency::Ripple => "XRP",
            Currency::Dogecoin => "DOGE",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.ticker())
    }
}

impl FromStr for Currency {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BTC" => Ok(Currency::Bitcoin),
            "ETH" => Ok(Currency::Ethereum),
            "LTC" => Ok(Currency::Litecoin),
            "XRP" => Ok(Currency::Ripple),
            "DOGE" => Ok(Currency::Dogecoin),
            _ => Err(()),
        }
    }
}

/// 单次抓取中提取出的地址
///
/// 只在流水线内部流转，不直接持久化；不带时间戳和来源，由入库环节补充。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedAddress {
    /// 地址字符串（大小写敏感）
    pub address: String,
    /// 币种
    pub currency: Currency,
    /// 首次出现位置附近的原文片段
    pub raw_match_context: Option<String>,
}

/// 地址记录实体
///
/// 持久化存储中的地址档案。`address` 全局唯一；`first_seen <= last_seen`；
/// `risk_score` 取值 0-100。分类、标签、备注、风险分和关注标记属于分析员
/// 维护的取证元数据，入库流程只会在新建时写入默认值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressRecord {
    /// 记录ID
    pub id: Uuid,
    /// 地址字符串，唯一键
    pub address: String,
    /// 币种
    pub currency: Currency,
    /// 来源URL
    pub source_url: String,
    /// 来源名称
    pub source_name: String,
    /// 首次发现时间
    pub first_seen: DateTime<Utc>,
    /// 最近一次发现时间
    pub last_seen: DateTime<Utc>,
    /// 最近更新时间
    pub last_updated: DateTime<Utc>,
    /// 分类
    pub category: Option<String>,
    /// 风险分 (0-100)
    pub risk_score: u8,
    /// 余额
    pub balance: f64,
    /// 交易数
    pub transaction_count: i64,
    /// 标签
    pub tags: BTreeSet<String>,
    /// 备注
    pub notes: Option<String>,
    /// 是否在关注列表中
    pub is_watched: bool,
}

impl AddressRecord {
    /// 为新发现的地址创建记录
    ///
    /// 首次与最近发现时间均为 `seen_at`，分类为 `unknown`，标签包含来源标签、
    /// 币种和网络层。
    pub fn discovered(
        extracted: &ExtractedAddress,
        source_url: &str,
        source_name: &str,
        layer_tag: &str,
        risk_score: u8,
        seen_at: DateTime<Utc>,
    ) -> Self {
        let tags = [
            PROVENANCE_TAG.to_string(),
            extracted.currency.ticker().to_ascii_lowercase(),
            layer_tag.to_string(),
        ]
        .into_iter()
        .collect();

        Self {
            id: Uuid::new_v4(),
            address: extracted.address.clone(),
            currency: extracted.currency,
            source_url: source_url.to_string(),
            source_name: source_name.to_string(),
            first_seen: seen_at,
            last_seen: seen_at,
            last_updated: seen_at,
            category: Some(DEFAULT_CATEGORY.to_string()),
            risk_score: risk_score.min(100),
            balance: 0.0,
            transaction_count: 0,
            tags,
            notes: Some(format!("Scraped from {}", source_url)),
            is_watched: false,
        }
    }
}
