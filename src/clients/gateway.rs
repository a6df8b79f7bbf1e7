//! 远程网关接口
//!
//! 所有远程操作的唯一入口，每个操作都有明确的请求/响应类型。
//! 业务层只依赖这个 trait，测试时可以替换为内存实现

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::models::{
    ActivityEntry, AnalysisResponse, AnalyzeRequest, AnalyticsPayload, DashboardStats,
    ResumeFile, StorageScope, SyncHistory, SyncStatus, Verdict,
};

/// 上传确认
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UploadAck {
    pub filename: String,
    pub size: u64,
}

/// 候选人更新请求（candidate_id 为候选人邮箱）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateUpdate {
    pub candidate_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recruiter_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Verdict>,
}

impl CandidateUpdate {
    pub fn notes(email: impl Into<String>, notes: impl Into<String>) -> Self {
        Self {
            candidate_id: email.into(),
            recruiter_notes: Some(notes.into()),
            verdict: None,
        }
    }

    pub fn verdict(email: impl Into<String>, verdict: Verdict) -> Self {
        Self {
            candidate_id: email.into(),
            recruiter_notes: None,
            verdict: Some(verdict),
        }
    }
}

/// 单封邮件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub email: String,
    pub subject: String,
    pub body: String,
}

/// 批量邮件（由服务器根据结论套用模板）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkEmailRequest {
    pub candidate_emails: Vec<String>,
    pub verdict: Verdict,
    pub role: String,
    pub company_name: String,
}

/// 健康检查结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy") || self.status.eq_ignore_ascii_case("ok")
    }
}

/// 远程网关
#[async_trait]
pub trait ScreenerGateway: Send + Sync {
    // ---- 简历入库 ----
    async fn upload_resume(&self, scope: StorageScope, file: &ResumeFile) -> AppResult<UploadAck>;
    async fn delete_resume(&self, scope: StorageScope, name: &str) -> AppResult<()>;
    async fn list_durable_files(&self) -> AppResult<Vec<String>>;
    async fn clear_temporary(&self) -> AppResult<()>;

    // ---- 邮箱同步 ----
    async fn trigger_sync(&self) -> AppResult<()>;
    async fn sync_status(&self) -> AppResult<SyncStatus>;
    async fn sync_history(&self) -> AppResult<SyncHistory>;
    async fn start_auto_sync(&self) -> AppResult<String>;

    // ---- 分析与结果 ----
    async fn analyze(&self, request: &AnalyzeRequest<'_>) -> AppResult<AnalysisResponse>;
    async fn export_csv(&self, verdict: Option<Verdict>) -> AppResult<Vec<u8>>;
    async fn candidate_summary(&self, email: &str) -> AppResult<Vec<u8>>;
    async fn update_candidate(&self, update: &CandidateUpdate) -> AppResult<()>;
    async fn send_email(&self, message: &EmailMessage) -> AppResult<()>;
    async fn send_bulk_email(&self, request: &BulkEmailRequest) -> AppResult<()>;

    // ---- 仪表盘 ----
    async fn dashboard_stats(&self) -> AppResult<DashboardStats>;
    async fn dashboard_analytics(&self) -> AppResult<AnalyticsPayload>;
    async fn recent_activity(&self) -> AppResult<Vec<ActivityEntry>>;

    async fn health(&self) -> AppResult<HealthStatus>;
}
