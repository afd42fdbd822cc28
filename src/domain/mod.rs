// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：目标、地址记录、作业
/// - 仓库接口（repositories）：数据持久化抽象接口
/// - 服务（services）：提取、入库、评分和作业跟踪
///
/// 领域层不依赖任何具体的传输或存储实现。
pub mod models;
pub mod repositories;
pub mod services;
