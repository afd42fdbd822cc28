// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 该模块定义了领域层的仓库接口，遵循依赖倒置原则。
/// 具体实现由基础设施层提供。
///
/// 包含的仓库接口：
/// - 地址仓库（address_repository）：地址记录的查找、条件插入和最近发现时间更新
/// - 作业仓库（scrape_job_repository）：抓取作业的持久化
pub mod address_repository;
pub mod scrape_job_repository;

#[cfg(test)]
pub(crate) mod memory;
