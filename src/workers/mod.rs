// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 提供作业编排和有界并发执行
pub mod manager;
pub mod orchestrator;
