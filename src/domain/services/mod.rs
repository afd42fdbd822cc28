// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 地址提取（address_extractor）：按币种匹配地址并过滤占位符
/// - 入库（ingestor）：查找、条件插入或推进最近发现时间
/// - 作业跟踪（job_tracker）：作业状态机与持久化
/// - 风险评分（risk_scoring）：新地址的初始风险分
pub mod address_extractor;
pub mod ingestor;
pub mod job_tracker;
pub mod risk_scoring;
