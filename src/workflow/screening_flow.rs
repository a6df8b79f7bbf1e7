//! 筛选流程 - 流程层
//!
//! 核心职责：定义"一次筛选"的完整流程
//!
//! 流程顺序：
//! 1. 上传简历（临时存储或持久存储）/ 触发邮箱同步
//! 2. 提交分析（带重入保护）
//! 3. 结果视图（筛选、备注、导出、邮件）
//! 4. 仪表盘（独立的聚合数据）

use std::sync::Arc;

use tracing::info;

use crate::clients::ScreenerGateway;
use crate::config::Config;
use crate::error::AppResult;
use crate::models::{JobConfiguration, ResumeFile, StorageScope, SyncStatus, UploadReport};
use crate::services::{
    AnalysisTrigger, DashboardService, DashboardView, IngestionManager, RefreshHandle,
    ResultsViewModel, SyncStatusPoller,
};
use crate::workflow::session_ctx::{SessionCtx, View};

/// 筛选流程
///
/// - 持有各业务能力，决定调用顺序
/// - 分析期间拒绝重复提交
/// - 不直接访问网络，只通过 services
pub struct ScreeningFlow {
    gateway: Arc<dyn ScreenerGateway>,
    ctx: SessionCtx,
    ingestion: IngestionManager,
    poller: SyncStatusPoller,
    trigger: AnalysisTrigger,
    results: ResultsViewModel,
    dashboard: DashboardService,
}

impl ScreeningFlow {
    /// 创建新的筛选流程
    pub fn new(gateway: Arc<dyn ScreenerGateway>, config: &Config) -> Self {
        Self {
            ctx: SessionCtx::new(),
            ingestion: IngestionManager::new(gateway.clone()),
            poller: SyncStatusPoller::with_delay(gateway.clone(), config.sync_poll_delay()),
            trigger: AnalysisTrigger::new(gateway.clone()),
            results: ResultsViewModel::empty(gateway.clone()),
            dashboard: DashboardService::new(gateway.clone()),
            gateway,
        }
    }

    pub fn session(&self) -> &SessionCtx {
        &self.ctx
    }

    pub fn ingestion(&self) -> &IngestionManager {
        &self.ingestion
    }

    pub fn ingestion_mut(&mut self) -> &mut IngestionManager {
        &mut self.ingestion
    }

    pub fn poller(&self) -> &SyncStatusPoller {
        &self.poller
    }

    pub fn results(&self) -> &ResultsViewModel {
        &self.results
    }

    pub fn results_mut(&mut self) -> &mut ResultsViewModel {
        &mut self.results
    }

    /// 上传简历到指定存储
    pub async fn upload(&mut self, scope: StorageScope, files: Vec<ResumeFile>) -> UploadReport {
        self.ctx.set_view(View::Screener);
        self.ingestion.upload_many(scope, files).await
    }

    /// 触发邮箱同步，完成后刷新持久存储列表
    pub async fn sync_mailbox(&mut self) -> AppResult<SyncStatus> {
        let status = self.poller.trigger_sync().await?;
        if status.files_uploaded > 0 {
            self.ingestion.refresh_durable().await?;
        }
        Ok(status)
    }

    /// 启动后台同步状态刷新
    pub fn watch_sync_status(&self, config: &Config) -> RefreshHandle {
        self.poller
            .spawn_background_refresh(config.status_refresh_interval())
    }

    /// 提交分析并切换到结果视图
    ///
    /// 已有分析进行中时返回 `AnalysisInFlight`，不发出请求
    pub async fn analyze(&mut self, job: &JobConfiguration) -> AppResult<&ResultsViewModel> {
        let _guard = self.ctx.begin_analysis()?;

        let result = self.trigger.analyze(job).await?;

        // 服务器分析完临时文件后会清空临时缓存
        if !job.load_from_blob {
            self.ingestion.forget_temporary();
        }

        self.ctx.set_session_id(result.metrics.session_id.clone());
        self.ctx.set_view(View::Results);
        info!("{} ✓ 结果已就绪: {} 名候选人", self.ctx, result.candidates.len());

        self.results = ResultsViewModel::new(self.gateway.clone(), result);
        Ok(&self.results)
    }

    /// 丢弃当前结果
    pub fn clear_results(&mut self) {
        self.results = ResultsViewModel::empty(self.gateway.clone());
        self.ctx.set_view(View::Screener);
    }

    /// 加载仪表盘
    pub async fn load_dashboard(&self) -> AppResult<DashboardView> {
        let view = self.dashboard.load().await?;
        self.ctx.set_view(View::Dashboard);
        Ok(view)
    }
}
