// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::super::helpers::{create_test_db, GENESIS};
use chrono::{Duration, Utc};
use coinsleuth::domain::models::address::{AddressRecord, Currency, ExtractedAddress};
use coinsleuth::domain::models::scrape_target::ScrapeTarget;
use coinsleuth::domain::repositories::address_repository::AddressRepository;
use coinsleuth::domain::services::ingestor::{IngestOutcome, Ingestor};
use coinsleuth::domain::services::risk_scoring::DefaultRiskScorer;
use coinsleuth::infrastructure::repositories::address_repo_impl::AddressRepositoryImpl;
use std::sync::Arc;

fn genesis() -> ExtractedAddress {
    ExtractedAddress {
        address: GENESIS.to_string(),
        currency: Currency::Bitcoin,
        raw_match_context: None,
    }
}

fn record(seen_at: chrono::DateTime<Utc>) -> AddressRecord {
    AddressRecord::discovered(&genesis(), "http://example.com/", "Example", "surface", 50, seen_at)
}

#[tokio::test]
async fn test_insert_if_absent_respects_unique_address() {
    let repo = AddressRepositoryImpl::new(create_test_db().await);
    let now = Utc::now();

    assert!(repo.insert_if_absent(&record(now)).await.unwrap());
    assert!(!repo.insert_if_absent(&record(now)).await.unwrap());
    assert_eq!(repo.count().await.unwrap(), 1);

    let stored = repo.find_by_address(GENESIS).await.unwrap().unwrap();
    assert_eq!(stored.currency, Currency::Bitcoin);
    assert_eq!(stored.risk_score, 50);
    assert_eq!(stored.category.as_deref(), Some("unknown"));
    assert!(stored.tags.contains("btc"));
    assert!(!stored.is_watched);
}

#[tokio::test]
async fn test_lookup_is_case_sensitive() {
    let repo = AddressRepositoryImpl::new(create_test_db().await);
    repo.insert_if_absent(&record(Utc::now())).await.unwrap();

    assert!(repo
        .find_by_address(&GENESIS.to_ascii_lowercase())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_touch_last_seen_never_moves_backwards() {
    let repo = AddressRepositoryImpl::new(create_test_db().await);
    let first = Utc::now() - Duration::hours(2);
    repo.insert_if_absent(&record(first)).await.unwrap();

    let later = first + Duration::hours(1);
    let touched = repo.touch_last_seen(GENESIS, later).await.unwrap().unwrap();
    assert_eq!(touched.first_seen.timestamp(), first.timestamp());
    assert_eq!(touched.last_seen.timestamp(), later.timestamp());

    let stale = first + Duration::minutes(5);
    let touched = repo.touch_last_seen(GENESIS, stale).await.unwrap().unwrap();
    assert_eq!(touched.last_seen.timestamp(), later.timestamp());
    assert_eq!(touched.source_name, "Example");
    assert_eq!(touched.risk_score, 50);
}

#[tokio::test]
async fn test_touch_missing_address_returns_none() {
    let repo = AddressRepositoryImpl::new(create_test_db().await);
    assert!(repo.touch_last_seen(GENESIS, Utc::now()).await.unwrap().is_none());
}

/// 并发入库同一地址只产生一次 Inserted，其余都是 Updated
#[tokio::test]
async fn test_concurrent_ingest_converges() {
    let repo = Arc::new(AddressRepositoryImpl::new(create_test_db().await));
    let ingestor = Arc::new(Ingestor::new(repo.clone(), Arc::new(DefaultRiskScorer::default())));
    let target = ScrapeTarget::new("http://example.com/", "Example").unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let ingestor = ingestor.clone();
            let target = target.clone();
            tokio::spawn(async move { ingestor.ingest(&genesis(), &target).await })
        })
        .collect();

    let mut inserted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            IngestOutcome::Inserted(_) => inserted += 1,
            IngestOutcome::Updated(_) => {}
            IngestOutcome::Skipped(reason) => panic!("unexpected skip: {}", reason),
        }
    }

    assert_eq!(inserted, 1);
    assert_eq!(repo.count().await.unwrap(), 1);
}
