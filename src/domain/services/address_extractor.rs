// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::address::{Currency, ExtractedAddress};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;

/// 原文片段在匹配位置两侧各保留的字节数
pub const CONTEXT_RADIUS: usize = 64;

/// `value` 属性参与扫描的最小长度
const MIN_VALUE_ATTR_LEN: usize = 20;

static BTC_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[13][a-km-zA-HJ-NP-Z1-9]{25,34}\b|\bbc1[a-z0-9]{39,59}\b").unwrap()
});
static ETH_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b0x[a-fA-F0-9]{40}\b").unwrap());
static LTC_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[LM][a-km-zA-HJ-NP-Z1-9]{26,33}\b|\bltc1[a-z0-9]{39,59}\b").unwrap()
});
static XRP_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\br[1-9A-HJ-NP-Za-km-z]{24,34}\b").unwrap());
static DOGE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bD[5-9A-HJ-NP-U][1-9A-HJ-NP-Za-km-z]{32}\b").unwrap());

// Regions where forums and code hosts tend to paste addresses
static SNIPPET_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)code|pre|snippet|address|wallet|crypto").unwrap());
static BLOCK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("code, pre, textarea").unwrap());
static CLASSED_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("[class]").unwrap());
static DATA_ADDRESS_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[data-address]").unwrap());
static VALUE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("[value]").unwrap());

fn pattern(currency: Currency) -> &'static Regex {
    match currency {
        Currency::Bitcoin => &BTC_PATTERN,
        Currency::Ethereum => &ETH_PATTERN,
        Currency::Litecoin => &LTC_PATTERN,
        Currency::Ripple => &XRP_PATTERN,
        Currency::Dogecoin => &DOGE_PATTERN,
    }
}

/// 地址提取器
///
/// 对抓取到的文本按币种运行正则匹配，单次抓取内去重，并用启发式规则
/// 过滤明显的占位符。规则刻意宽松，不做 base58check / bech32 / EIP-55 校验，
/// 误报交由人工复核。
#[derive(Debug, Clone)]
pub struct AddressExtractor {
    currencies: Vec<Currency>,
}

impl Default for AddressExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl AddressExtractor {
    /// 创建识别全部币种的提取器
    pub fn new() -> Self {
        Self {
            currencies: Currency::ALL.to_vec(),
        }
    }

    /// 只识别指定币种
    pub fn with_currencies(currencies: &[Currency]) -> Self {
        Self {
            currencies: currencies.to_vec(),
        }
    }

    /// 从文本中提取地址
    ///
    /// 结果按首次出现位置排序，同一地址只出现一次；没有匹配时返回空列表。
    pub fn extract(&self, text: &str) -> Vec<ExtractedAddress> {
        let mut matches: Vec<(usize, usize, Currency)> = Vec::new();

        for &currency in &self.currencies {
            for m in pattern(currency).find_iter(text) {
                if is_plausible(currency, m.as_str()) {
                    matches.push((m.start(), m.end(), currency));
                }
            }
        }

        matches.sort_by_key(|(start, _, _)| *start);

        let mut seen = HashSet::new();
        matches
            .into_iter()
            .filter_map(|(start, end, currency)| {
                let address = &text[start..end];
                if !seen.insert(address) {
                    return None;
                }
                Some(ExtractedAddress {
                    address: address.to_string(),
                    currency,
                    raw_match_context: Some(context_around(text, start, end)),
                })
            })
            .collect()
    }

    /// 从响应体中提取地址，HTML 会先展开成扫描文本
    pub fn extract_from_content(&self, body: &str, content_type: &str) -> Vec<ExtractedAddress> {
        self.extract(&scan_text(body, content_type))
    }
}

/// 构造待扫描文本
///
/// HTML 响应取页面全文，再追加代码块、可疑 class 元素的文本以及
/// `data-address` / 长 `value` 属性；其他内容类型原样返回。
pub fn scan_text(body: &str, content_type: &str) -> String {
    if !looks_like_html(body, content_type) {
        return body.to_string();
    }

    let document = Html::parse_document(body);
    let mut parts: Vec<String> = vec![document.root_element().text().collect::<Vec<_>>().join(" ")];

    for element in document.select(&BLOCK_SELECTOR) {
        parts.push(element.text().collect::<String>());
    }

    for element in document.select(&CLASSED_SELECTOR) {
        let matches_class = element
            .value()
            .attr("class")
            .is_some_and(|class| SNIPPET_CLASS.is_match(class));
        if matches_class {
            parts.push(element.text().collect::<String>());
        }
    }

    for element in document.select(&DATA_ADDRESS_SELECTOR) {
        if let Some(value) = element.value().attr("data-address") {
            parts.push(value.to_string());
        }
    }

    for element in document.select(&VALUE_SELECTOR) {
        if let Some(value) = element.value().attr("value") {
            if value.len() > MIN_VALUE_ATTR_LEN {
                parts.push(value.to_string());
            }
        }
    }

    parts.join(" ")
}

fn looks_like_html(body: &str, content_type: &str) -> bool {
    if content_type.to_ascii_lowercase().contains("html") {
        return true;
    }
    let head: String = body.trim_start().chars().take(15).collect();
    let head = head.to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}

/// 按币种判断候选串是否像真实地址
pub fn is_plausible(currency: Currency, candidate: &str) -> bool {
    match currency {
        Currency::Bitcoin | Currency::Litecoin | Currency::Dogecoin => {
            is_plausible_base58_like(candidate)
        }
        Currency::Ethereum => is_plausible_ethereum(candidate),
        Currency::Ripple => {
            (25..=35).contains(&candidate.len()) && longest_run(candidate) < PLACEHOLDER_RUN
        }
    }
}

/// 连续相同字符达到该长度即视为占位符
const PLACEHOLDER_RUN: usize = 8;

fn is_plausible_base58_like(candidate: &str) -> bool {
    if !(26..=62).contains(&candidate.len()) {
        return false;
    }
    if candidate.starts_with("111111") || candidate.ends_with("00000") {
        return false;
    }
    longest_run(candidate) < PLACEHOLDER_RUN
}

fn is_plausible_ethereum(candidate: &str) -> bool {
    if candidate.len() != 42 {
        return false;
    }
    let Some(body) = candidate.strip_prefix("0x") else {
        return false;
    };
    let uniform = |c: char| body.chars().all(|b| b.eq_ignore_ascii_case(&c));
    !(uniform('0') || uniform('1') || uniform('f'))
}

fn longest_run(s: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    let mut previous = None;
    for c in s.chars() {
        if Some(c) == previous {
            current += 1;
        } else {
            current = 1;
            previous = Some(c);
        }
        longest = longest.max(current);
    }
    longest
}

fn context_around(text: &str, start: usize, end: usize) -> String {
    let mut from = start.saturating_sub(CONTEXT_RADIUS);
    while !text.is_char_boundary(from) {
        from -= 1;
    }
    let mut to = (end + CONTEXT_RADIUS).min(text.len());
    while !text.is_char_boundary(to) {
        to += 1;
    }
    text[from..to].split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
#[path = "address_extractor_test.rs"]
mod tests;
