// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::super::helpers::create_test_db;
use coinsleuth::domain::models::scrape_job::{FailureKind, JobStatus, ScrapeJob};
use coinsleuth::domain::models::scrape_target::{NetworkLayer, ScrapeTarget};
use coinsleuth::domain::repositories::scrape_job_repository::ScrapeJobRepository;
use coinsleuth::infrastructure::repositories::scrape_job_repo_impl::ScrapeJobRepositoryImpl;

#[tokio::test]
async fn test_save_tracks_each_transition() {
    let repo = ScrapeJobRepositoryImpl::new(create_test_db().await);
    let target = ScrapeTarget::new("http://example.com/forum", "Forum").unwrap();
    let mut job = ScrapeJob::new(target);

    repo.save(&job).await.unwrap();
    let pending = repo.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(pending.status, JobStatus::Pending);
    assert!(pending.started_at.is_none());

    job.start().unwrap();
    job.fetch_attempts = 2;
    repo.save(&job).await.unwrap();

    job.complete(3, 1).unwrap();
    repo.save(&job).await.unwrap();

    let saved = repo.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(saved.status, JobStatus::Completed);
    assert_eq!(saved.addresses_extracted, 3);
    assert_eq!(saved.addresses_new, 1);
    assert_eq!(saved.fetch_attempts, 2);
    assert!(saved.started_at.is_some());
    assert!(saved.completed_at.is_some());
    assert_eq!(saved.target.url(), "http://example.com/forum");
    assert_eq!(saved.target.display_name(), "Forum");
}

#[tokio::test]
async fn test_failed_job_round_trips_failure_kind() {
    let repo = ScrapeJobRepositoryImpl::new(create_test_db().await);
    let target = ScrapeTarget::new("http://marketxyz.onion/", "Market").unwrap();
    let mut job = ScrapeJob::new(target);
    job.fail(FailureKind::Configuration, "tor proxy is not configured").unwrap();

    repo.save(&job).await.unwrap();

    let saved = repo.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(saved.status, JobStatus::Failed);
    assert_eq!(saved.failure_kind, Some(FailureKind::Configuration));
    assert_eq!(
        saved.error.as_deref(),
        Some("configuration error: tor proxy is not configured")
    );
    assert_eq!(saved.target.network_layer(), NetworkLayer::Tor);
    assert!(saved.target.requires_proxy());
}

#[tokio::test]
async fn test_recent_returns_newest_first() {
    let repo = ScrapeJobRepositoryImpl::new(create_test_db().await);
    let mut ids = Vec::new();

    for i in 0..3 {
        let target = ScrapeTarget::new(format!("http://example.com/{}", i), "").unwrap();
        let mut job = ScrapeJob::new(target);
        job.created_at += chrono::Duration::seconds(i);
        repo.save(&job).await.unwrap();
        ids.push(job.id);
    }

    let recent = repo.recent(2).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].id, ids[2]);
    assert_eq!(recent[1].id, ids[1]);
}

#[tokio::test]
async fn test_unknown_job_is_none() {
    let repo = ScrapeJobRepositoryImpl::new(create_test_db().await);
    assert!(repo.find_by_id(uuid::Uuid::new_v4()).await.unwrap().is_none());
}
