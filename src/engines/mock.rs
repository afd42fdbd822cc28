// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 测试用传输层

use crate::engines::traits::{FetchError, FetchRequest, FetchResponse, HttpTransport};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::time::Instant;

/// 按脚本返回结果的传输层，记录每次调用的请求与时间
///
/// 脚本耗尽后返回空白页面。
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<FetchResponse, FetchError>>>,
    calls: Mutex<Vec<(FetchRequest, Instant)>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<FetchResponse, FetchError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(FetchRequest, Instant)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: &FetchRequest) -> Result<FetchResponse, FetchError> {
        self.calls.lock().push((request.clone(), Instant::now()));
        let next = self.script.lock().pop_front();
        next.unwrap_or_else(|| Ok(ok_response("<html></html>")))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// 一直挂起直到被取消的传输层
pub struct HangingTransport {
    calls: Mutex<u32>,
}

impl HangingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(0),
        })
    }

    pub fn calls(&self) -> u32 {
        *self.calls.lock()
    }
}

#[async_trait]
impl HttpTransport for HangingTransport {
    async fn send(&self, _request: &FetchRequest) -> Result<FetchResponse, FetchError> {
        *self.calls.lock() += 1;
        std::future::pending().await
    }

    fn name(&self) -> &'static str {
        "hanging"
    }
}

pub fn ok_response(body: &str) -> FetchResponse {
    FetchResponse {
        status_code: 200,
        body: body.to_string(),
        content_type: "text/html".to_string(),
    }
}

pub fn status(code: u16) -> FetchResponse {
    FetchResponse {
        status_code: code,
        body: String::new(),
        content_type: "text/html".to_string(),
    }
}
