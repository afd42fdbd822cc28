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

use crate::domain::models::scrape_job::{FailureKind, JobStatus, ScrapeJob};
use crate::domain::models::scrape_target::{NetworkLayer, ScrapeTarget};
use crate::domain::repositories::address_repository::RepositoryError;
use crate::domain::repositories::scrape_job_repository::ScrapeJobRepository;
use crate::infrastructure::database::entities::scrape_job as job_entity;
use async_trait::async_trait;
use sea_orm::{
    sea_query::OnConflict, DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 作业仓库实现
#[derive(Clone)]
pub struct ScrapeJobRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl ScrapeJobRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl TryFrom<job_entity::Model> for ScrapeJob {
    type Error = RepositoryError;

    fn try_from(model: job_entity::Model) -> Result<Self, Self::Error> {
        let corrupt = |field: &str, value: &str| {
            RepositoryError::Corrupt(format!("job {}: invalid {} '{}'", model.id, field, value))
        };

        let layer: NetworkLayer = model
            .network_layer
            .parse()
            .map_err(|_| corrupt("network_layer", &model.network_layer))?;
        let target = ScrapeTarget::from_parts(&model.url, &model.display_name, layer, model.requires_proxy)
            .map_err(|e| RepositoryError::Corrupt(e.to_string()))?;
        let status: JobStatus = model
            .status
            .parse()
            .map_err(|_| corrupt("status", &model.status))?;
        let failure_kind = model
            .failure_kind
            .as_deref()
            .map(|kind| kind.parse::<FailureKind>().map_err(|_| corrupt("failure_kind", kind)))
            .transpose()?;

        Ok(Self {
            id: model.id,
            target,
            status,
            created_at: model.created_at,
            started_at: model.started_at,
            completed_at: model.completed_at,
            addresses_extracted: model.addresses_extracted.max(0) as u32,
            addresses_new: model.addresses_new.max(0) as u32,
            fetch_attempts: model.fetch_attempts.max(0) as u32,
            failure_kind,
            error: model.error,
        })
    }
}

impl From<&ScrapeJob> for job_entity::ActiveModel {
    fn from(job: &ScrapeJob) -> Self {
        Self {
            id: Set(job.id),
            url: Set(job.target.url().to_string()),
            display_name: Set(job.target.display_name().to_string()),
            network_layer: Set(job.target.network_layer().to_string()),
            requires_proxy: Set(job.target.requires_proxy()),
            status: Set(job.status.to_string()),
            created_at: Set(job.created_at),
            started_at: Set(job.started_at),
            completed_at: Set(job.completed_at),
            addresses_extracted: Set(job.addresses_extracted as i32),
            addresses_new: Set(job.addresses_new as i32),
            fetch_attempts: Set(job.fetch_attempts as i32),
            failure_kind: Set(job.failure_kind.map(|kind| kind.to_string())),
            error: Set(job.error.clone()),
        }
    }
}

#[async_trait]
impl ScrapeJobRepository for ScrapeJobRepositoryImpl {
    async fn save(&self, job: &ScrapeJob) -> Result<(), RepositoryError> {
        job_entity::Entity::insert(job_entity::ActiveModel::from(job))
            .on_conflict(
                OnConflict::column(job_entity::Column::Id)
                    .update_columns([
                        job_entity::Column::Status,
                        job_entity::Column::StartedAt,
                        job_entity::Column::CompletedAt,
                        job_entity::Column::AddressesExtracted,
                        job_entity::Column::AddressesNew,
                        job_entity::Column::FetchAttempts,
                        job_entity::Column::FailureKind,
                        job_entity::Column::Error,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ScrapeJob>, RepositoryError> {
        job_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .map(ScrapeJob::try_from)
            .transpose()
    }

    async fn recent(&self, limit: u64) -> Result<Vec<ScrapeJob>, RepositoryError> {
        job_entity::Entity::find()
            .order_by_desc(job_entity::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(ScrapeJob::try_from)
            .collect()
    }
}
