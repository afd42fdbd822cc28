// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 测试用内存仓库

use crate::domain::models::address::AddressRecord;
use crate::domain::models::scrape_job::{JobStatus, ScrapeJob};
use crate::domain::repositories::address_repository::{AddressRepository, RepositoryError};
use crate::domain::repositories::scrape_job_repository::ScrapeJobRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use sea_orm::DbErr;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryAddressRepository {
    records: Mutex<HashMap<String, AddressRecord>>,
    failing: AtomicBool,
}

impl InMemoryAddressRepository {
    pub fn with_records(records: Vec<AddressRecord>) -> Self {
        let repo = Self::default();
        {
            let mut map = repo.records.lock();
            for record in records {
                map.insert(record.address.clone(), record);
            }
        }
        repo
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn get(&self, address: &str) -> Option<AddressRecord> {
        self.records.lock().get(address).cloned()
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(DbErr::Custom(
                "store unavailable".to_string(),
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl AddressRepository for InMemoryAddressRepository {
    async fn find_by_address(&self, address: &str) -> Result<Option<AddressRecord>, RepositoryError> {
        self.check()?;
        Ok(self.records.lock().get(address).cloned())
    }

    async fn insert_if_absent(&self, record: &AddressRecord) -> Result<bool, RepositoryError> {
        self.check()?;
        let mut records = self.records.lock();
        if records.contains_key(&record.address) {
            return Ok(false);
        }
        records.insert(record.address.clone(), record.clone());
        Ok(true)
    }

    async fn touch_last_seen(
        &self,
        address: &str,
        seen_at: DateTime<Utc>,
    ) -> Result<Option<AddressRecord>, RepositoryError> {
        self.check()?;
        let mut records = self.records.lock();
        Ok(records.get_mut(address).map(|record| {
            if seen_at > record.last_seen {
                record.last_seen = seen_at;
            }
            record.last_updated = seen_at;
            record.clone()
        }))
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        self.check()?;
        Ok(self.records.lock().len() as u64)
    }
}

/// 记录每次保存时作业状态的内存作业仓库
#[derive(Default)]
pub struct InMemoryJobRepository {
    jobs: Mutex<HashMap<Uuid, ScrapeJob>>,
    history: Mutex<Vec<(Uuid, JobStatus)>>,
    failing: AtomicBool,
}

impl InMemoryJobRepository {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// 某个作业被保存过的状态序列
    pub fn statuses(&self, id: Uuid) -> Vec<JobStatus> {
        self.history
            .lock()
            .iter()
            .filter(|(job_id, _)| *job_id == id)
            .map(|(_, status)| *status)
            .collect()
    }
}

#[async_trait]
impl ScrapeJobRepository for InMemoryJobRepository {
    async fn save(&self, job: &ScrapeJob) -> Result<(), RepositoryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(DbErr::Custom(
                "store unavailable".to_string(),
            )));
        }
        self.history.lock().push((job.id, job.status));
        self.jobs.lock().insert(job.id, job.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ScrapeJob>, RepositoryError> {
        Ok(self.jobs.lock().get(&id).cloned())
    }

    async fn recent(&self, limit: u64) -> Result<Vec<ScrapeJob>, RepositoryError> {
        let mut jobs: Vec<ScrapeJob> = self.jobs.lock().values().cloned().collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs.truncate(limit as usize);
        Ok(jobs)
    }
}
