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

use crate::domain::models::address::{AddressRecord, Currency};
use crate::domain::repositories::address_repository::{AddressRepository, RepositoryError};
use crate::infrastructure::database::entities::address_record as address_entity;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set,
};
use std::collections::BTreeSet;
use std::sync::Arc;

/// 地址仓库实现
///
/// 基于SeaORM实现，唯一约束由 `uq_address_records_address` 索引保证
#[derive(Clone)]
pub struct AddressRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl AddressRepositoryImpl {
    /// 创建新的地址仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl TryFrom<address_entity::Model> for AddressRecord {
    type Error = RepositoryError;

    fn try_from(model: address_entity::Model) -> Result<Self, Self::Error> {
        let currency: Currency = model
            .currency
            .parse()
            .map_err(|_| RepositoryError::Corrupt(format!("unknown currency '{}'", model.currency)))?;
        let tags: BTreeSet<String> = serde_json::from_value(model.tags)
            .map_err(|e| RepositoryError::Corrupt(format!("invalid tags: {}", e)))?;

        Ok(Self {
            id: model.id,
            address: model.address,
            currency,
            source_url: model.source_url,
            source_name: model.source_name,
            first_seen: model.first_seen,
            last_seen: model.last_seen,
            last_updated: model.last_updated,
            category: model.category,
            risk_score: model.risk_score.clamp(0, 100) as u8,
            balance: model.balance,
            transaction_count: model.transaction_count,
            tags,
            notes: model.notes,
            is_watched: model.is_watched,
        })
    }
}

impl From<&AddressRecord> for address_entity::ActiveModel {
    fn from(record: &AddressRecord) -> Self {
        Self {
            id: Set(record.id),
            address: Set(record.address.clone()),
            currency: Set(record.currency.ticker().to_string()),
            source_url: Set(record.source_url.clone()),
            source_name: Set(record.source_name.clone()),
            first_seen: Set(record.first_seen),
            last_seen: Set(record.last_seen),
            last_updated: Set(record.last_updated),
            category: Set(record.category.clone()),
            risk_score: Set(i32::from(record.risk_score)),
            balance: Set(record.balance),
            transaction_count: Set(record.transaction_count),
            tags: Set(serde_json::json!(record.tags)),
            notes: Set(record.notes.clone()),
            is_watched: Set(record.is_watched),
        }
    }
}

#[async_trait]
impl AddressRepository for AddressRepositoryImpl {
    async fn find_by_address(&self, address: &str) -> Result<Option<AddressRecord>, RepositoryError> {
        address_entity::Entity::find()
            .filter(address_entity::Column::Address.eq(address))
            .one(self.db.as_ref())
            .await?
            .map(AddressRecord::try_from)
            .transpose()
    }

    async fn insert_if_absent(&self, record: &AddressRecord) -> Result<bool, RepositoryError> {
        let inserted = address_entity::Entity::insert(address_entity::ActiveModel::from(record))
            .on_conflict(
                OnConflict::column(address_entity::Column::Address)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await?;

        Ok(inserted > 0)
    }

    async fn touch_last_seen(
        &self,
        address: &str,
        seen_at: DateTime<Utc>,
    ) -> Result<Option<AddressRecord>, RepositoryError> {
        // Single statement so concurrent touches never move last_seen backwards
        let result = address_entity::Entity::update_many()
            .col_expr(
                address_entity::Column::LastSeen,
                Expr::case(
                    Expr::col(address_entity::Column::LastSeen).lt(seen_at),
                    Expr::value(seen_at),
                )
                .finally(Expr::col(address_entity::Column::LastSeen))
                .into(),
            )
            .col_expr(address_entity::Column::LastUpdated, Expr::value(seen_at))
            .filter(address_entity::Column::Address.eq(address))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        self.find_by_address(address).await
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(address_entity::Entity::find()
            .count(self.db.as_ref())
            .await?)
    }
}
