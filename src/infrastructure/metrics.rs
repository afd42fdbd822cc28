// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::MetricsSettings;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

/// 安装 Prometheus 指标导出器
///
/// 地址无效或安装失败只记录警告，指标宏在没有导出器时为空操作。
pub fn init_metrics(settings: &MetricsSettings) {
    if !settings.enabled {
        info!("Metrics exporter disabled");
        return;
    }

    let addr: SocketAddr = match settings.listen_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!("Invalid metrics address '{}': {}", settings.listen_addr, e);
            return;
        }
    };

    // Ignore error if address is already in use (for development/testing)
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!("Failed to install Prometheus recorder: {}. This might happen if the port is already in use.", e);
        return;
    }

    describe_metrics();
    info!("Metrics exporter listening on {}", addr);
}

fn describe_metrics() {
    metrics::describe_counter!("coinsleuth_jobs_total", "Scrape jobs finished, by final status");
    metrics::describe_counter!(
        "coinsleuth_fetch_attempts_total",
        "Network fetch attempts, by network layer"
    );
    metrics::describe_counter!(
        "coinsleuth_addresses_ingested_total",
        "Ingestion outcomes, by outcome"
    );
    metrics::describe_histogram!(
        "coinsleuth_job_duration_seconds",
        metrics::Unit::Seconds,
        "Wall-clock duration of scrape jobs"
    );
}
