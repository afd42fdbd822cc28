// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 地址（address）：币种、提取结果和持久化的地址记录
/// - 抓取作业（scrape_job）：作业状态机、失败分类和作业结果
/// - 抓取目标（scrape_target）：带网络层信息的不可变目标快照
pub mod address;
pub mod scrape_job;
pub mod scrape_target;
