//! 内存网关（仅测试使用）
//!
//! 记录每次调用，并按预设返回成功或失败

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::clients::gateway::{
    BulkEmailRequest, CandidateUpdate, EmailMessage, HealthStatus, ScreenerGateway, UploadAck,
};
use crate::error::{AppResult, RemoteError};
use crate::models::{
    ActivityEntry, AnalysisResponse, AnalyzeRequest, AnalyticsPayload, DashboardStats,
    ResumeFile, StorageScope, SyncHistory, SyncStatus, Verdict,
};

#[derive(Default)]
pub struct FakeGateway {
    /// 调用日志（操作名）
    pub calls: Mutex<Vec<String>>,
    /// 上传会失败的文件名
    pub failing_uploads: Mutex<HashSet<String>>,
    /// 删除会失败的文件名
    pub failing_deletes: Mutex<HashSet<String>>,
    /// 服务器端的持久存储
    pub durable_files: Mutex<Vec<String>>,
    pub fail_list: Mutex<bool>,
    pub status: Mutex<SyncStatus>,
    pub fail_trigger: Mutex<bool>,
    pub fail_status: Mutex<bool>,
    pub analysis: Mutex<Option<AnalysisResponse>>,
    pub analysis_error: Mutex<Option<RemoteError>>,
    pub fail_updates: Mutex<bool>,
    pub updates: Mutex<Vec<CandidateUpdate>>,
    pub emails: Mutex<Vec<EmailMessage>>,
    pub bulk_emails: Mutex<Vec<BulkEmailRequest>>,
    pub analytics: Mutex<AnalyticsPayload>,
    pub stats: Mutex<DashboardStats>,
    pub activity: Mutex<Vec<ActivityEntry>>,
}

pub fn remote_error(endpoint: &str, detail: &str) -> RemoteError {
    RemoteError::Status {
        endpoint: endpoint.to_string(),
        status: 500,
        detail: Some(detail.to_string()),
    }
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    /// 某个操作被调用的次数
    pub fn count(&self, call: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.as_str() == call)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn fail_upload(&self, name: &str) {
        self.failing_uploads.lock().unwrap().insert(name.to_string());
    }

    pub fn fail_delete(&self, name: &str) {
        self.failing_deletes.lock().unwrap().insert(name.to_string());
    }
}

#[async_trait]
impl ScreenerGateway for FakeGateway {
    async fn upload_resume(&self, scope: StorageScope, file: &ResumeFile) -> AppResult<UploadAck> {
        self.record(format!("upload:{}", file.name));
        if self.failing_uploads.lock().unwrap().contains(&file.name) {
            return Err(remote_error("/api/screener/upload", "Upload to Azure failed").into());
        }
        if scope == StorageScope::Durable {
            let mut durable = self.durable_files.lock().unwrap();
            if !durable.contains(&file.name) {
                durable.push(file.name.clone());
            }
        }
        Ok(UploadAck {
            filename: file.name.clone(),
            size: file.size() as u64,
        })
    }

    async fn delete_resume(&self, scope: StorageScope, name: &str) -> AppResult<()> {
        self.record(format!("delete:{}", name));
        if self.failing_deletes.lock().unwrap().contains(name) {
            return Err(remote_error("/api/screener/delete", "File not found in temporary storage").into());
        }
        if scope == StorageScope::Durable {
            self.durable_files.lock().unwrap().retain(|f| f != name);
        }
        Ok(())
    }

    async fn list_durable_files(&self) -> AppResult<Vec<String>> {
        self.record("list");
        if *self.fail_list.lock().unwrap() {
            return Err(remote_error("/api/screener/list-blob-files", "list down").into());
        }
        Ok(self.durable_files.lock().unwrap().clone())
    }

    async fn clear_temporary(&self) -> AppResult<()> {
        self.record("clear");
        Ok(())
    }

    async fn trigger_sync(&self) -> AppResult<()> {
        self.record("trigger");
        if *self.fail_trigger.lock().unwrap() {
            return Err(remote_error("/api/gmail/sync", "Gmail sync failed: invalid credentials").into());
        }
        Ok(())
    }

    async fn sync_status(&self) -> AppResult<SyncStatus> {
        self.record("status");
        if *self.fail_status.lock().unwrap() {
            return Err(remote_error("/api/gmail/status", "status unavailable").into());
        }
        Ok(self.status.lock().unwrap().clone())
    }

    async fn sync_history(&self) -> AppResult<SyncHistory> {
        self.record("history");
        let status = self.status.lock().unwrap().clone();
        Ok(SyncHistory {
            last_sync: status.last_sync,
            total_emails_processed: status.emails_processed,
            total_files_uploaded: status.files_uploaded,
            recent_errors: status.errors,
        })
    }

    async fn start_auto_sync(&self) -> AppResult<String> {
        self.record("auto_sync");
        Ok("Auto-sync feature not implemented yet".to_string())
    }

    async fn analyze(&self, _request: &AnalyzeRequest<'_>) -> AppResult<AnalysisResponse> {
        self.record("analyze");
        if let Some(err) = self.analysis_error.lock().unwrap().clone() {
            return Err(err.into());
        }
        Ok(self.analysis.lock().unwrap().clone().unwrap_or_default())
    }

    async fn export_csv(&self, verdict: Option<Verdict>) -> AppResult<Vec<u8>> {
        self.record("export");
        let scope = verdict.map(|v| v.as_str()).unwrap_or("all");
        Ok(format!("name,email,verdict\n# {}\n", scope).into_bytes())
    }

    async fn candidate_summary(&self, email: &str) -> AppResult<Vec<u8>> {
        self.record("summary");
        Ok(format!("%PDF-{}", email).into_bytes())
    }

    async fn update_candidate(&self, update: &CandidateUpdate) -> AppResult<()> {
        self.record("update");
        if *self.fail_updates.lock().unwrap() {
            return Err(remote_error("/api/screener/candidate/update", "Candidate not found").into());
        }
        self.updates.lock().unwrap().push(update.clone());
        Ok(())
    }

    async fn send_email(&self, message: &EmailMessage) -> AppResult<()> {
        self.record("email");
        self.emails.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn send_bulk_email(&self, request: &BulkEmailRequest) -> AppResult<()> {
        self.record("bulk_email");
        self.bulk_emails.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn dashboard_stats(&self) -> AppResult<DashboardStats> {
        self.record("stats");
        Ok(self.stats.lock().unwrap().clone())
    }

    async fn dashboard_analytics(&self) -> AppResult<AnalyticsPayload> {
        self.record("analytics");
        Ok(self.analytics.lock().unwrap().clone())
    }

    async fn recent_activity(&self) -> AppResult<Vec<ActivityEntry>> {
        self.record("activity");
        Ok(self.activity.lock().unwrap().clone())
    }

    async fn health(&self) -> AppResult<HealthStatus> {
        self.record("health");
        Ok(HealthStatus {
            status: "healthy".to_string(),
        })
    }
}
