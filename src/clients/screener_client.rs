/// 筛选服务 HTTP 客户端
///
/// 封装所有与后端 REST API 的调用逻辑（JSON 与 multipart）
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::clients::gateway::{
    BulkEmailRequest, CandidateUpdate, EmailMessage, HealthStatus, ScreenerGateway, UploadAck,
};
use crate::config::Config;
use crate::error::{AppResult, ConfigError, RemoteError, ValidationError};
use crate::models::loaders::is_supported_resume;
use crate::models::{
    ActivityEntry, AnalysisResponse, AnalyzeRequest, AnalyticsPayload, DashboardStats,
    ResumeFile, StorageScope, SyncHistory, SyncStatus, Verdict,
};

/// 单个简历文件大小上限（10MB）
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// 后端统一的响应包装
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

fn default_success() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileList {
    files: Vec<String>,
}

/// 筛选服务 HTTP 客户端
pub struct ScreenerClient {
    http: Client,
    base_url: Url,
}

impl ScreenerClient {
    /// 根据配置创建客户端
    ///
    /// 未配置超时时使用 reqwest 默认值（分析请求可能持续数分钟）
    pub fn new(config: &Config) -> AppResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| ConfigError::ClientBuildFailed {
            message: e.to_string(),
        })?;

        Self::with_client(http, &config.api_base_url)
    }

    /// 使用已有的 reqwest 客户端创建
    pub fn with_client(http: Client, base_url: &str) -> AppResult<Self> {
        let base_url = Url::parse(base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ConfigError::InvalidBaseUrl {
                url: base_url.to_string(),
            })?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// 拼接 URL，每个片段都会被正确转义（文件名、邮箱可能包含特殊字符）
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// 发送请求并把非 2xx 响应转换为 RemoteError
    async fn send(&self, endpoint: &str, request: RequestBuilder) -> Result<Response, RemoteError> {
        debug!("请求: {}", endpoint);

        let response = request.send().await.map_err(|e| RemoteError::Transport {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = extract_detail(&body);
        warn!("请求失败 {} (HTTP {}): {:?}", endpoint, status.as_u16(), detail);

        Err(RemoteError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            detail,
        })
    }

    async fn json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<T, RemoteError> {
        let response = self.send(endpoint, request).await?;
        response.json::<T>().await.map_err(|e| RemoteError::Decode {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
    }

    /// 解析 `{success, message, data}` 包装，`success: false` 视为被拒绝
    async fn wrapped<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<ApiResponse<T>, RemoteError> {
        let wrapped: ApiResponse<T> = self.json(endpoint, request).await?;
        if !wrapped.success {
            return Err(RemoteError::Rejected {
                endpoint: endpoint.to_string(),
                message: wrapped.message,
            });
        }
        Ok(wrapped)
    }

    async fn ack(&self, endpoint: &str, request: RequestBuilder) -> Result<(), RemoteError> {
        self.wrapped::<Value>(endpoint, request).await.map(|_| ())
    }

    async fn bytes(&self, endpoint: &str, request: RequestBuilder) -> Result<Vec<u8>, RemoteError> {
        let response = self.send(endpoint, request).await?;
        let bytes = response.bytes().await.map_err(|e| RemoteError::Transport {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;
        Ok(bytes.to_vec())
    }
}

/// 上传前的文件检查（类型与大小）
fn check_resume_file(file: &ResumeFile) -> Result<(), ValidationError> {
    let mut err = ValidationError::new();
    if !is_supported_resume(&file.name) {
        err.push(
            "file",
            format!("{}: Unsupported file type. Allowed: .pdf, .docx, .doc", file.name),
        );
    }
    if file.size() > MAX_FILE_SIZE {
        err.push(
            "file",
            format!("{}: File exceeds the 10 MB limit", file.name),
        );
    }
    err.into_result()
}

fn mime_for(file_name: &str) -> &'static str {
    let lower = file_name.to_lowercase();
    if lower.ends_with(".pdf") {
        "application/pdf"
    } else if lower.ends_with(".docx") {
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    } else if lower.ends_with(".doc") {
        "application/msword"
    } else {
        "application/octet-stream"
    }
}

/// 从错误响应体中提取 detail
///
/// 后端可能返回 `{"detail": ...}` 或 `{"error": ..., "status_code": ...}`
fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let detail = value.get("detail").or_else(|| value.get("error"))?;
    match detail {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn upload_path(scope: StorageScope) -> &'static str {
    match scope {
        StorageScope::Temporary => "upload",
        StorageScope::Durable => "upload-to-blob",
    }
}

fn delete_path(scope: StorageScope) -> &'static str {
    match scope {
        StorageScope::Temporary => "delete-temp",
        StorageScope::Durable => "delete-blob",
    }
}

#[async_trait]
impl ScreenerGateway for ScreenerClient {
    async fn upload_resume(&self, scope: StorageScope, file: &ResumeFile) -> AppResult<UploadAck> {
        check_resume_file(file)?;

        let endpoint = format!("/api/screener/{}", upload_path(scope));
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(mime_for(&file.name))
            .map_err(|e| RemoteError::Transport {
                endpoint: endpoint.clone(),
                message: e.to_string(),
            })?;
        let form = Form::new().part("file", part);

        let request = self
            .http
            .post(self.url(&["api", "screener", upload_path(scope)]))
            .multipart(form);
        let wrapped: ApiResponse<UploadAck> = self.wrapped(&endpoint, request).await?;

        Ok(wrapped.data.unwrap_or_else(|| UploadAck {
            filename: file.name.clone(),
            size: file.size() as u64,
        }))
    }

    async fn delete_resume(&self, scope: StorageScope, name: &str) -> AppResult<()> {
        let endpoint = format!("/api/screener/{}/{}", delete_path(scope), name);
        let request = self
            .http
            .delete(self.url(&["api", "screener", delete_path(scope), name]));
        Ok(self.ack(&endpoint, request).await?)
    }

    async fn list_durable_files(&self) -> AppResult<Vec<String>> {
        let request = self
            .http
            .get(self.url(&["api", "screener", "list-blob-files"]));
        let wrapped: ApiResponse<FileList> = self
            .wrapped("/api/screener/list-blob-files", request)
            .await?;
        Ok(wrapped.data.unwrap_or_default().files)
    }

    async fn clear_temporary(&self) -> AppResult<()> {
        let request = self.http.delete(self.url(&["api", "screener", "clear-cache"]));
        Ok(self.ack("/api/screener/clear-cache", request).await?)
    }

    async fn trigger_sync(&self) -> AppResult<()> {
        let request = self.http.post(self.url(&["api", "gmail", "sync"]));
        Ok(self.ack("/api/gmail/sync", request).await?)
    }

    async fn sync_status(&self) -> AppResult<SyncStatus> {
        let request = self.http.get(self.url(&["api", "gmail", "status"]));
        Ok(self.json("/api/gmail/status", request).await?)
    }

    async fn sync_history(&self) -> AppResult<SyncHistory> {
        let request = self.http.get(self.url(&["api", "gmail", "history"]));
        let wrapped: ApiResponse<SyncHistory> =
            self.wrapped("/api/gmail/history", request).await?;
        Ok(wrapped.data.unwrap_or_default())
    }

    async fn start_auto_sync(&self) -> AppResult<String> {
        let request = self.http.post(self.url(&["api", "gmail", "start-auto-sync"]));
        let wrapped: ApiResponse<Value> = self
            .wrapped("/api/gmail/start-auto-sync", request)
            .await?;
        Ok(wrapped.message)
    }

    async fn analyze(&self, request: &AnalyzeRequest<'_>) -> AppResult<AnalysisResponse> {
        let builder = self
            .http
            .post(self.url(&["api", "screener", "analyze"]))
            .json(request);
        Ok(self.json("/api/screener/analyze", builder).await?)
    }

    async fn export_csv(&self, verdict: Option<Verdict>) -> AppResult<Vec<u8>> {
        let mut request = self.http.get(self.url(&["api", "screener", "export", "csv"]));
        if let Some(verdict) = verdict {
            request = request.query(&[("verdict", verdict.as_str())]);
        }
        Ok(self.bytes("/api/screener/export/csv", request).await?)
    }

    async fn candidate_summary(&self, email: &str) -> AppResult<Vec<u8>> {
        let endpoint = format!("/api/screener/summary/{}", email);
        let request = self.http.get(self.url(&["api", "screener", "summary", email]));
        Ok(self.bytes(&endpoint, request).await?)
    }

    async fn update_candidate(&self, update: &CandidateUpdate) -> AppResult<()> {
        let request = self
            .http
            .patch(self.url(&["api", "screener", "candidate", "update"]))
            .json(update);
        Ok(self.ack("/api/screener/candidate/update", request).await?)
    }

    async fn send_email(&self, message: &EmailMessage) -> AppResult<()> {
        let request = self
            .http
            .post(self.url(&["api", "screener", "email", "send"]))
            .json(message);
        Ok(self.ack("/api/screener/email/send", request).await?)
    }

    async fn send_bulk_email(&self, request: &BulkEmailRequest) -> AppResult<()> {
        let builder = self
            .http
            .post(self.url(&["api", "screener", "email", "bulk"]))
            .json(request);
        Ok(self.ack("/api/screener/email/bulk", builder).await?)
    }

    async fn dashboard_stats(&self) -> AppResult<DashboardStats> {
        let request = self.http.get(self.url(&["api", "dashboard", "stats"]));
        Ok(self.json("/api/dashboard/stats", request).await?)
    }

    async fn dashboard_analytics(&self) -> AppResult<AnalyticsPayload> {
        let request = self.http.get(self.url(&["api", "dashboard", "analytics"]));
        let wrapped: ApiResponse<AnalyticsPayload> =
            self.wrapped("/api/dashboard/analytics", request).await?;
        Ok(wrapped.data.unwrap_or_default())
    }

    async fn recent_activity(&self) -> AppResult<Vec<ActivityEntry>> {
        let request = self.http.get(self.url(&["api", "dashboard", "recent-activity"]));
        let wrapped: ApiResponse<Vec<ActivityEntry>> = self
            .wrapped("/api/dashboard/recent-activity", request)
            .await?;
        Ok(wrapped.data.unwrap_or_default())
    }

    async fn health(&self) -> AppResult<HealthStatus> {
        let request = self.http.get(self.url(&["health"]));
        Ok(self.json("/health", request).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_detail_variants() {
        assert_eq!(
            extract_detail(r#"{"detail": "No resumes uploaded. Please upload resumes first."}"#),
            Some("No resumes uploaded. Please upload resumes first.".to_string())
        );
        assert_eq!(
            extract_detail(r#"{"error": "Candidate not found", "status_code": 404}"#),
            Some("Candidate not found".to_string())
        );
        assert_eq!(extract_detail("<html>Bad Gateway</html>"), None);
        assert_eq!(extract_detail(r#"{"detail": null}"#), None);
    }

    #[test]
    fn test_url_segments_are_escaped() {
        let client =
            ScreenerClient::with_client(Client::new(), "http://localhost:8000").unwrap();
        let url = client.url(&["api", "screener", "delete-temp", "my resume#1.pdf"]);
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/screener/delete-temp/my%20resume%231.pdf"
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        assert!(ScreenerClient::with_client(Client::new(), "not a url").is_err());
        assert!(ScreenerClient::with_client(Client::new(), "mailto:a@x.com").is_err());
    }

    #[test]
    fn test_check_resume_file() {
        assert!(check_resume_file(&ResumeFile::new("a.pdf", vec![0; 10])).is_ok());

        let err = check_resume_file(&ResumeFile::new("a.txt", vec![0; 10])).unwrap_err();
        assert!(err.has_field("file"));

        let err =
            check_resume_file(&ResumeFile::new("big.pdf", vec![0; MAX_FILE_SIZE + 1])).unwrap_err();
        assert_eq!(err.violations.len(), 1);
    }
}
