// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_db, spawn_site, ETH_ADDRESS, GENESIS};
use coinsleuth::domain::models::address::Currency;
use coinsleuth::domain::models::scrape_job::{FailureKind, JobStatus};
use coinsleuth::domain::models::scrape_target::ScrapeTarget;
use coinsleuth::domain::repositories::address_repository::AddressRepository;
use coinsleuth::domain::repositories::scrape_job_repository::ScrapeJobRepository;
use coinsleuth::engines::network_fetcher::{NetworkFetcher, ProxyEndpoints};
use coinsleuth::engines::reqwest_engine::ReqwestTransport;
use coinsleuth::infrastructure::repositories::address_repo_impl::AddressRepositoryImpl;
use coinsleuth::infrastructure::repositories::scrape_job_repo_impl::ScrapeJobRepositoryImpl;
use coinsleuth::workers::manager::WorkerManager;
use coinsleuth::workers::orchestrator::{ScrapeConfig, ScrapeOrchestrator};
use std::sync::Arc;
use std::time::Duration;

type Orchestrator = ScrapeOrchestrator<AddressRepositoryImpl, ScrapeJobRepositoryImpl>;

struct Pipeline {
    orchestrator: Arc<Orchestrator>,
    addresses: Arc<AddressRepositoryImpl>,
    jobs: Arc<ScrapeJobRepositoryImpl>,
}

async fn pipeline(proxies: ProxyEndpoints) -> Pipeline {
    let db = create_test_db().await;
    let addresses = Arc::new(AddressRepositoryImpl::new(db.clone()));
    let jobs = Arc::new(ScrapeJobRepositoryImpl::new(db));
    let fetcher = Arc::new(NetworkFetcher::new(Arc::new(ReqwestTransport), proxies));

    Pipeline {
        orchestrator: Arc::new(ScrapeOrchestrator::new(
            fetcher,
            addresses.clone(),
            jobs.clone(),
        )),
        addresses,
        jobs,
    }
}

fn config() -> ScrapeConfig {
    ScrapeConfig {
        timeout_base: Duration::from_secs(5),
        max_retries: 2,
        backoff_unit: Duration::from_millis(10),
        job_timeout: Duration::from_secs(30),
        ..ScrapeConfig::default()
    }
}

/// 端到端：抓取本地页面，提取并入库，重复运行不产生新地址
#[tokio::test]
async fn test_surface_page_is_ingested_once() {
    let addr = spawn_site().await;
    let p = pipeline(ProxyEndpoints::default()).await;
    let target = ScrapeTarget::new(format!("http://{}/donate", addr), "Local donate page").unwrap();

    let first = p.orchestrator.run_job(target.clone(), &config()).await;

    assert_eq!(first.job.status, JobStatus::Completed, "{:?}", first.job.error);
    assert_eq!(first.job.addresses_extracted, 1);
    assert_eq!(first.job.addresses_new, 1);
    assert_eq!(first.job.fetch_attempts, 1);
    assert_eq!(first.records.len(), 1);
    assert_eq!(first.records[0].address, GENESIS);

    let stored = p.addresses.find_by_address(GENESIS).await.unwrap().unwrap();
    assert_eq!(stored.currency, Currency::Bitcoin);
    assert_eq!(stored.source_name, "Local donate page");
    assert!(stored.tags.contains("scraped"));
    assert!(stored.tags.contains("surface"));

    let second = p.orchestrator.run_job(target, &config()).await;
    assert_eq!(second.job.status, JobStatus::Completed);
    assert_eq!(second.job.addresses_extracted, 1);
    assert_eq!(second.job.addresses_new, 0);
    assert_eq!(p.addresses.count().await.unwrap(), 1);

    let after = p.addresses.find_by_address(GENESIS).await.unwrap().unwrap();
    assert_eq!(after.first_seen, stored.first_seen);
    assert!(after.last_seen >= stored.last_seen);

    let saved = p.jobs.find_by_id(second.job.id).await.unwrap().unwrap();
    assert_eq!(saved.status, JobStatus::Completed);
    assert_eq!(saved.addresses_new, 0);
}

#[tokio::test]
async fn test_attribute_values_are_scanned() {
    let addr = spawn_site().await;
    let p = pipeline(ProxyEndpoints::default()).await;
    let target = ScrapeTarget::new(format!("http://{}/wallets", addr), "Wallets").unwrap();

    let result = p.orchestrator.run_job(target, &config()).await;

    assert!(result.is_success());
    assert_eq!(result.job.addresses_extracted, 2);
    assert_eq!(result.job.addresses_new, 2);
    assert!(p.addresses.find_by_address(ETH_ADDRESS).await.unwrap().is_some());
}

#[tokio::test]
async fn test_page_without_addresses_completes_empty() {
    let addr = spawn_site().await;
    let p = pipeline(ProxyEndpoints::default()).await;
    let target = ScrapeTarget::new(format!("http://{}/empty", addr), "").unwrap();

    let result = p.orchestrator.run_job(target, &config()).await;

    assert_eq!(result.job.status, JobStatus::Completed);
    assert_eq!(result.job.addresses_extracted, 0);
    assert!(result.records.is_empty());
    assert_eq!(p.addresses.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_upstream_errors_exhaust_retries() {
    let addr = spawn_site().await;
    let p = pipeline(ProxyEndpoints::default()).await;
    let target = ScrapeTarget::new(format!("http://{}/broken", addr), "Broken").unwrap();

    let result = p.orchestrator.run_job(target, &config()).await;

    assert_eq!(result.job.status, JobStatus::Failed);
    assert_eq!(result.job.failure_kind, Some(FailureKind::Upstream));
    assert_eq!(result.job.fetch_attempts, 2);
    assert!(result.job.error.as_deref().unwrap().contains("503"));
}

/// 未配置 Tor 代理时 .onion 目标直接失败，不发出任何请求
#[tokio::test]
async fn test_onion_target_without_proxy_is_refused() {
    let p = pipeline(ProxyEndpoints::default()).await;
    let target = ScrapeTarget::new("http://exampleonionaddress.onion/", "Hidden market").unwrap();

    let result = p.orchestrator.run_job(target, &config()).await;

    assert_eq!(result.job.status, JobStatus::Failed);
    assert_eq!(result.job.failure_kind, Some(FailureKind::Configuration));
    assert_eq!(result.job.fetch_attempts, 0);
    assert!(result.job.started_at.is_none());

    let saved = p.jobs.find_by_id(result.job.id).await.unwrap().unwrap();
    assert_eq!(saved.status, JobStatus::Failed);
    assert_eq!(saved.failure_kind, Some(FailureKind::Configuration));
}

/// 多个作业并发抓取同一地址，最终只有一条记录
#[tokio::test]
async fn test_concurrent_jobs_converge_on_one_record() {
    let addr = spawn_site().await;
    let p = pipeline(ProxyEndpoints::default()).await;
    let manager = WorkerManager::new(p.orchestrator.clone(), config(), 4);

    let targets = (0..4)
        .map(|i| ScrapeTarget::new(format!("http://{}/donate?copy={}", addr, i), "").unwrap())
        .collect();

    let results = manager.run_batch(targets).await;

    assert_eq!(results.len(), 4);
    assert!(results.iter().all(|r| r.is_success()));
    let inserted: u32 = results.iter().map(|r| r.job.addresses_new).sum();
    assert_eq!(inserted, 1);
    assert_eq!(p.addresses.count().await.unwrap(), 1);
    assert_eq!(p.jobs.recent(10).await.unwrap().len(), 4);
}
