// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::scrape_job::ScrapeJob;
use crate::domain::repositories::address_repository::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 抓取作业仓库特质
///
/// 定义作业记录的数据访问接口，作业在每次状态转换后保存。
#[async_trait]
pub trait ScrapeJobRepository: Send + Sync {
    /// 保存作业（按ID插入或覆盖）
    async fn save(&self, job: &ScrapeJob) -> Result<(), RepositoryError>;
    /// 根据ID查找作业
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ScrapeJob>, RepositoryError>;
    /// 最近创建的作业
    async fn recent(&self, limit: u64) -> Result<Vec<ScrapeJob>, RepositoryError>;
}
