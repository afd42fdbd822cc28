// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::address::AddressRecord;
use crate::domain::models::scrape_target::ScrapeTarget;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// 作业状态枚举
///
/// 状态转换遵循以下流程，且不可回退：
/// Pending → Running → Completed/Failed
/// 在进入 Running 之前发生的配置类错误直接转为 Failed。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// 已创建，尚未开始
    #[default]
    Pending,
    /// 执行中
    Running,
    /// 已完成
    Completed,
    /// 已失败
    Failed,
}

impl JobStatus {
    /// 是否为终止状态
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for JobStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            _ => Err(()),
        }
    }
}

/// 失败分类
///
/// 让运维人员区分“修代理配置”、“稍后重试”、“来源拦截或宕机”和“作业超时”。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// 配置错误（代理缺失或无效），不会重试
    Configuration,
    /// 传输层瞬时故障（超时、连接错误）
    Transient,
    /// 上游返回非 2xx 状态码
    Upstream,
    /// 作业整体超时被取消
    Timeout,
}

impl FailureKind {
    /// 错误信息前缀
    pub fn label(&self) -> &'static str {
        match self {
            FailureKind::Configuration => "configuration error",
            FailureKind::Transient => "network error",
            FailureKind::Upstream => "upstream error",
            FailureKind::Timeout => "job timed out",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FailureKind::Configuration => write!(f, "configuration"),
            FailureKind::Transient => write!(f, "transient"),
            FailureKind::Upstream => write!(f, "upstream"),
            FailureKind::Timeout => write!(f, "timeout"),
        }
    }
}

impl FromStr for FailureKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "configuration" => Ok(FailureKind::Configuration),
            "transient" => Ok(FailureKind::Transient),
            "upstream" => Ok(FailureKind::Upstream),
            "timeout" => Ok(FailureKind::Timeout),
            _ => Err(()),
        }
    }
}

/// 领域错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// 无效的状态转换
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: JobStatus, to: JobStatus },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// 抓取作业实体
///
/// 记录一次抓取的生命周期、计数和错误信息。作业独占自己的目标快照。
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeJob {
    /// 作业ID
    pub id: Uuid,
    /// 目标快照
    pub target: ScrapeTarget,
    /// 当前状态
    pub status: JobStatus,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 开始时间
    pub started_at: Option<DateTime<Utc>>,
    /// 结束时间
    pub completed_at: Option<DateTime<Utc>>,
    /// 通过校验的地址数
    pub addresses_extracted: u32,
    /// 新入库的地址数
    pub addresses_new: u32,
    /// 实际发出的网络请求次数
    pub fetch_attempts: u32,
    /// 失败分类
    pub failure_kind: Option<FailureKind>,
    /// 错误信息
    pub error: Option<String>,
}

impl ScrapeJob {
    /// 创建一个处于 Pending 状态的作业
    pub fn new(target: ScrapeTarget) -> Self {
        Self {
            id: Uuid::new_v4(),
            target,
            status: JobStatus::Pending,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            addresses_extracted: 0,
            addresses_new: 0,
            fetch_attempts: 0,
            failure_kind: None,
            error: None,
        }
    }

    /// 启动作业
    ///
    /// 将作业状态从 Pending 变更为 Running
    pub fn start(&mut self) -> Result<(), DomainError> {
        match self.status {
            JobStatus::Pending => {
                self.status = JobStatus::Running;
                self.started_at = Some(Utc::now());
                Ok(())
            }
            from => Err(DomainError::InvalidStateTransition {
                from,
                to: JobStatus::Running,
            }),
        }
    }

    /// 完成作业
    ///
    /// 将作业状态从 Running 变更为 Completed 并记录最终计数
    pub fn complete(&mut self, addresses_extracted: u32, addresses_new: u32) -> Result<(), DomainError> {
        match self.status {
            JobStatus::Running => {
                self.status = JobStatus::Completed;
                self.completed_at = Some(Utc::now());
                self.addresses_extracted = addresses_extracted;
                self.addresses_new = addresses_new;
                Ok(())
            }
            from => Err(DomainError::InvalidStateTransition {
                from,
                to: JobStatus::Completed,
            }),
        }
    }

    /// 标记作业失败
    ///
    /// Pending 或 Running 均可直接转为 Failed；错误信息以分类前缀开头。
    pub fn fail(&mut self, kind: FailureKind, error: impl fmt::Display) -> Result<(), DomainError> {
        match self.status {
            JobStatus::Pending | JobStatus::Running => {
                self.status = JobStatus::Failed;
                self.completed_at = Some(Utc::now());
                self.failure_kind = Some(kind);
                self.error = Some(format!("{}: {}", kind.label(), error));
                Ok(())
            }
            from => Err(DomainError::InvalidStateTransition {
                from,
                to: JobStatus::Failed,
            }),
        }
    }

    /// 是否已进入终止状态
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// 作业结果
///
/// 作业的最终快照以及本次触及（新建或更新）的地址记录。
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeJobResult {
    /// 作业快照
    pub job: ScrapeJob,
    /// 本次触及的地址记录
    pub records: Vec<AddressRecord>,
}

impl ScrapeJobResult {
    /// 作业是否成功完成
    pub fn is_success(&self) -> bool {
        self.job.status == JobStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> ScrapeJob {
        ScrapeJob::new(ScrapeTarget::new("http://example.com", "Example").unwrap())
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut job = job();
        assert_eq!(job.status, JobStatus::Pending);

        job.start().unwrap();
        assert_eq!(job.status, JobStatus::Running);
        assert!(job.started_at.is_some());

        job.complete(3, 2).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.addresses_extracted, 3);
        assert_eq!(job.addresses_new, 2);
        assert!(job.completed_at.is_some());
        assert!(job.error.is_none());
    }

    #[test]
    fn test_fail_from_pending_leaves_started_at_unset() {
        let mut job = job();
        job.fail(FailureKind::Configuration, "tor proxy missing").unwrap();

        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.started_at.is_none());
        assert_eq!(
            job.error.as_deref(),
            Some("configuration error: tor proxy missing")
        );
    }

    #[test]
    fn test_terminal_states_are_final() {
        let mut job = job();
        job.start().unwrap();
        job.fail(FailureKind::Transient, "reset").unwrap();

        assert!(job.start().is_err());
        assert!(job.complete(1, 1).is_err());
        assert!(job.fail(FailureKind::Upstream, "again").is_err());
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("network error: reset"));
    }

    #[test]
    fn test_complete_requires_running() {
        let mut job = job();
        let err = job.complete(0, 0).unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidStateTransition {
                from: JobStatus::Pending,
                to: JobStatus::Completed
            }
        );
    }
}
