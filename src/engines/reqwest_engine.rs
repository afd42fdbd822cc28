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

use crate::engines::traits::{FetchError, FetchRequest, FetchResponse, HttpTransport};
use async_trait::async_trait;

/// HTTP传输层
///
/// 基于reqwest实现，每次请求使用独立的客户端
pub struct ReqwestTransport;

impl ReqwestTransport {
    fn map_error(request: &FetchRequest, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout(request.timeout)
        } else {
            FetchError::Connection(error.to_string())
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    /// 执行HTTP请求
    ///
    /// # 参数
    ///
    /// * `request` - 抓取请求
    ///
    /// # 返回值
    ///
    /// * `Ok(FetchResponse)` - 任意状态码的响应
    /// * `Err(FetchError)` - 请求未得到响应
    async fn send(&self, request: &FetchRequest) -> Result<FetchResponse, FetchError> {
        // Each request gets a fresh client so connections never outlive the attempt
        let mut builder = reqwest::Client::builder()
            .user_agent(request.user_agent.as_str())
            .timeout(request.timeout);

        match &request.proxy {
            Some(proxy_url) => {
                let proxy =
                    reqwest::Proxy::all(proxy_url).map_err(|e| FetchError::InvalidProxy {
                        endpoint: proxy_url.clone(),
                        reason: e.to_string(),
                    })?;
                builder = builder.proxy(proxy);
            }
            None => {
                builder = builder.no_proxy();
            }
        }

        if request.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|e| FetchError::Connection(format!("failed to build client: {}", e)))?;

        let response = client
            .get(&request.url)
            .send()
            .await
            .map_err(|e| Self::map_error(request, e))?;

        let status_code = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.trim().is_empty())
            .unwrap_or("text/html")
            .to_string();

        let body = response
            .text()
            .await
            .map_err(|e| Self::map_error(request, e))?;

        Ok(FetchResponse {
            status_code,
            body,
            content_type,
        })
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
