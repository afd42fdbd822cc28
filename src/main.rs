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

use coinsleuth::config::settings::Settings;
use coinsleuth::domain::models::scrape_target::ScrapeTarget;
use coinsleuth::engines::network_fetcher::NetworkFetcher;
use coinsleuth::engines::reqwest_engine::ReqwestTransport;
use coinsleuth::infrastructure::database::connection;
use coinsleuth::infrastructure::metrics;
use coinsleuth::infrastructure::repositories::address_repo_impl::AddressRepositoryImpl;
use coinsleuth::infrastructure::repositories::scrape_job_repo_impl::ScrapeJobRepositoryImpl;
use coinsleuth::queue::scheduler::SeedScheduler;
use coinsleuth::utils::telemetry;
use coinsleuth::workers::manager::WorkerManager;
use coinsleuth::workers::orchestrator::ScrapeOrchestrator;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// 主函数
///
/// 不带参数时按配置的种子列表持续调度；
/// 带 URL 参数时只对这些目标执行一次作业并以 JSON 输出结果。
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting coinsleuth...");

    // 2. Load configuration
    let settings = Settings::new()?;
    let scrape_config = settings.scraper.scrape_config()?;

    // 3. Initialize Prometheus metrics
    metrics::init_metrics(&settings.metrics);

    // 4. Database
    let db = Arc::new(connection::connect_and_migrate(&settings.database).await?);
    let address_repo = Arc::new(AddressRepositoryImpl::new(db.clone()));
    let job_repo = Arc::new(ScrapeJobRepositoryImpl::new(db.clone()));

    // 5. Pipeline
    let fetcher = Arc::new(
        NetworkFetcher::new(Arc::new(ReqwestTransport), settings.proxy.endpoints())
            .with_backoff_unit(scrape_config.backoff_unit)
            .with_user_agent(settings.scraper.user_agent.clone()),
    );
    let orchestrator = Arc::new(ScrapeOrchestrator::new(fetcher, address_repo, job_repo));
    let mut manager = WorkerManager::new(
        orchestrator,
        scrape_config,
        settings.scraper.worker_concurrency,
    );

    let urls: Vec<String> = std::env::args().skip(1).collect();
    if !urls.is_empty() {
        let mut targets = Vec::with_capacity(urls.len());
        for url in &urls {
            targets.push(ScrapeTarget::new(url.as_str(), url.as_str())?);
        }

        let results = manager.run_batch(targets).await;
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    // 6. Scheduler
    let scheduler = Arc::new(SeedScheduler::new(&settings.seeds));
    if scheduler.is_empty() {
        warn!("No enabled seeds configured, scheduler will stay idle");
    }
    info!(seeds = scheduler.len(), "Starting seed scheduler");
    manager.start_scheduler(scheduler, Duration::from_secs(settings.scheduler.tick_secs.max(1)));

    manager.wait_for_shutdown().await;
    info!("coinsleuth stopped");
    Ok(())
}
