// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含核心业务实体、服务和仓库接口
pub mod domain;

/// 引擎模块
///
/// 网络传输、路由选择与重试
pub mod engines;

/// 基础设施模块
///
/// 提供数据库和指标等外部服务集成
pub mod infrastructure;

/// 队列模块
///
/// 种子调度
pub mod queue;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;

/// 工作器模块
///
/// 作业编排和工作器管理
pub mod workers;

pub use domain::models::scrape_job::{ScrapeJob, ScrapeJobResult};
pub use domain::models::scrape_target::{NetworkLayer, ScrapeTarget};
pub use workers::orchestrator::{ScrapeConfig, ScrapeOrchestrator};
