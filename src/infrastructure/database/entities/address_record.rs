// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "address_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub address: String,
    pub currency: String,
    pub source_url: String,
    pub source_name: String,
    pub first_seen: DateTimeUtc,
    pub last_seen: DateTimeUtc,
    pub last_updated: DateTimeUtc,
    pub category: Option<String>,
    pub risk_score: i32,
    #[sea_orm(column_type = "Double")]
    pub balance: f64,
    pub transaction_count: i64,
    pub tags: Json,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub is_watched: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
