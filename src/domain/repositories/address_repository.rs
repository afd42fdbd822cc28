// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::address::AddressRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DbErr;
use thiserror::Error;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
    /// 存储中的数据无法映射为领域对象
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// 地址仓库特质
///
/// 地址以大小写敏感的原始字符串作为唯一键。实现必须在存储层强制唯一约束，
/// 它是并发入库时的最终正确性保障。
#[async_trait]
pub trait AddressRepository: Send + Sync {
    /// 根据地址查找记录
    async fn find_by_address(&self, address: &str) -> Result<Option<AddressRecord>, RepositoryError>;

    /// 仅在地址不存在时插入
    ///
    /// 返回 `false` 表示唯一约束冲突（另一个作业已先插入）。
    async fn insert_if_absent(&self, record: &AddressRecord) -> Result<bool, RepositoryError>;

    /// 推进 `last_seen` / `last_updated`
    ///
    /// 只修改这两个字段，且 `last_seen` 不会倒退。地址不存在时返回 `None`。
    async fn touch_last_seen(
        &self,
        address: &str,
        seen_at: DateTime<Utc>,
    ) -> Result<Option<AddressRecord>, RepositoryError>;

    /// 记录总数
    async fn count(&self) -> Result<u64, RepositoryError>;
}
