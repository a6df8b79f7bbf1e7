//! 简历入库服务 - 业务能力层
//!
//! 管理两个相互独立的简历集合：
//! - 临时存储：会话内有效，客户端为准，上传/删除成功后直接修改本地列表
//! - 持久存储：服务器为准（邮箱同步可能同时修改），每次变更后重新拉取，从不本地预改
//!
//! 文件类型与大小的校验不在这里做，交给网关

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::clients::ScreenerGateway;
use crate::error::{AppError, AppResult};
use crate::models::{
    DeleteReport, IngestedFile, ResumeFile, StorageScope, UploadFailure, UploadProgress,
    UploadReport,
};

/// 简历入库服务
///
/// 职责：
/// - 逐个上传文件，单个失败不影响其余文件
/// - 返回成功/失败划分，而不是整体成功或失败
/// - 维护两个集合的本地视图
///
/// 所有方法都在调用方的 future 中执行，丢弃该 future 即取消后续的刷新
pub struct IngestionManager {
    gateway: Arc<dyn ScreenerGateway>,
    temporary: Vec<String>,
    durable: Vec<String>,
}

impl IngestionManager {
    /// 创建新的入库服务
    pub fn new(gateway: Arc<dyn ScreenerGateway>) -> Self {
        Self {
            gateway,
            temporary: Vec::new(),
            durable: Vec::new(),
        }
    }

    /// 某个集合当前的文件名（按加入顺序）
    pub fn names(&self, scope: StorageScope) -> &[String] {
        match scope {
            StorageScope::Temporary => &self.temporary,
            StorageScope::Durable => &self.durable,
        }
    }

    /// 某个集合当前的文件
    pub fn files(&self, scope: StorageScope) -> Vec<IngestedFile> {
        self.names(scope)
            .iter()
            .map(|name| IngestedFile {
                name: name.clone(),
                scope,
            })
            .collect()
    }

    pub fn contains(&self, scope: StorageScope, name: &str) -> bool {
        self.names(scope).iter().any(|n| n == name)
    }

    /// 批量上传
    pub async fn upload_many(
        &mut self,
        scope: StorageScope,
        files: Vec<ResumeFile>,
    ) -> UploadReport {
        self.upload_many_with_progress(scope, files, |_| {}).await
    }

    /// 批量上传，并在每个文件完成后报告进度
    ///
    /// 文件按顺序逐个上传，这样失败可以精确对应到某个文件，进度也是单调的
    pub async fn upload_many_with_progress<F>(
        &mut self,
        scope: StorageScope,
        files: Vec<ResumeFile>,
        mut on_progress: F,
    ) -> UploadReport
    where
        F: FnMut(UploadProgress),
    {
        let total = files.len();
        let mut report = UploadReport::default();

        info!("📤 开始上传 {} 个文件到{}", total, scope);

        for (idx, file) in files.into_iter().enumerate() {
            let ok = match self.gateway.upload_resume(scope, &file).await {
                Ok(ack) => {
                    debug!("✓ 上传成功: {} ({} 字节)", ack.filename, ack.size);
                    if scope == StorageScope::Temporary {
                        self.insert_temporary(&file.name);
                    }
                    report.succeeded.push(file.name.clone());
                    true
                }
                Err(error) => {
                    warn!("⚠️ 上传失败: {}: {}", file.name, error);
                    report.failed.push(UploadFailure {
                        name: file.name.clone(),
                        error,
                    });
                    false
                }
            };

            on_progress(UploadProgress {
                completed: idx + 1,
                total,
                name: file.name,
                ok,
            });
        }

        if scope == StorageScope::Durable && !report.succeeded.is_empty() {
            if let Err(e) = self.refresh_durable().await {
                warn!("⚠️ 上传后刷新持久存储列表失败: {}", e);
                report.refresh_error = Some(e);
            }
        }

        info!(
            "✓ 上传完成: 成功 {}/{}，失败 {}",
            report.succeeded.len(),
            total,
            report.failed.len()
        );

        report
    }

    /// 按文件名删除
    ///
    /// 远程删除失败时返回 `AppError::Delete`，本地列表保持不变。
    /// 持久存储删除成功但随后的重新拉取失败时仍返回 `Ok`，
    /// 本地移除该文件，拉取错误记在 `refresh_error` 中
    pub async fn delete_file(
        &mut self,
        scope: StorageScope,
        name: &str,
    ) -> AppResult<DeleteReport> {
        self.gateway
            .delete_resume(scope, name)
            .await
            .map_err(|e| match e {
                AppError::Remote(source) => AppError::delete_failed(scope, name, source),
                other => other,
            })?;

        info!("🗑️ 已从{}删除: {}", scope, name);

        let mut report = DeleteReport::default();
        match scope {
            StorageScope::Temporary => {
                self.temporary.retain(|n| n != name);
            }
            StorageScope::Durable => {
                if let Err(e) = self.refresh_durable().await {
                    warn!("⚠️ 删除后刷新持久存储列表失败: {}", e);
                    self.durable.retain(|n| n != name);
                    report.refresh_error = Some(e);
                }
            }
        }

        Ok(report)
    }

    /// 从服务器重新拉取持久存储列表
    pub async fn refresh_durable(&mut self) -> AppResult<&[String]> {
        let files = self.gateway.list_durable_files().await?;
        debug!("持久存储共有 {} 个文件", files.len());
        self.durable = files;
        Ok(&self.durable)
    }

    /// 清空临时存储（服务器端与本地）
    pub async fn clear_temporary(&mut self) -> AppResult<usize> {
        self.gateway.clear_temporary().await?;
        let count = self.temporary.len();
        self.temporary.clear();
        info!("🧹 已清空临时存储 ({} 个文件)", count);
        Ok(count)
    }

    /// 仅清空本地临时列表
    ///
    /// 服务器在使用临时文件完成分析后会自行丢弃它们
    pub fn forget_temporary(&mut self) {
        self.temporary.clear();
    }

    fn insert_temporary(&mut self, name: &str) {
        if !self.temporary.iter().any(|n| n == name) {
            self.temporary.push(name.to_string());
        }
    }
}
