//! 应用运行器 - 编排层
//!
//! ## 职责
//!
//! 本模块是命令行入口，负责一次完整的筛选运行。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：日志文件、HTTP 客户端、健康检查
//! 2. **加载输入**：职位配置（TOML）与简历目录
//! 3. **上传简历**：按职位配置选择临时存储或持久存储
//! 4. **邮箱同步**：可选，分析前触发一次
//! 5. **分析与导出**：提交分析，输出汇总，写出 CSV

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::clients::{ScreenerClient, ScreenerGateway};
use crate::config::Config;
use crate::models::{load_job_config, load_resume_files, StorageScope};
use crate::utils::logging::{
    init_log_file, log_blocking_wait, log_startup, log_upload_report, print_analysis_summary,
};
use crate::workflow::ScreeningFlow;

/// 应用主结构
pub struct App {
    config: Config,
    gateway: Arc<dyn ScreenerGateway>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        init_log_file(&config.output_log_file)
            .await
            .with_context(|| format!("无法创建日志文件 {}", config.output_log_file))?;

        log_startup(&config);

        let client = ScreenerClient::new(&config)?;
        let gateway: Arc<dyn ScreenerGateway> = Arc::new(client);

        // 后端不可用时只警告，后续请求会给出具体错误
        match gateway.health().await {
            Ok(health) if health.is_healthy() => info!("✓ 后端服务正常"),
            Ok(health) => warn!("⚠️ 后端状态异常: {}", health.status),
            Err(e) => warn!("⚠️ 无法连接后端 {}: {}", config.api_base_url, e),
        }

        Ok(Self::with_gateway(config, gateway))
    }

    /// 使用已有网关创建应用
    pub fn with_gateway(config: Config, gateway: Arc<dyn ScreenerGateway>) -> Self {
        Self { config, gateway }
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        let job = load_job_config(Path::new(&self.config.job_config_path))
            .await
            .context("加载职位配置失败")?;

        let mut flow = ScreeningFlow::new(self.gateway.clone(), &self.config);
        let scope = if job.load_from_blob {
            StorageScope::Durable
        } else {
            StorageScope::Temporary
        };

        // 上传本地简历
        info!("\n📁 正在扫描简历目录...");
        let files = load_resume_files(&self.config.resume_folder)
            .await
            .context("加载简历失败")?;

        if files.is_empty() {
            if scope == StorageScope::Temporary {
                warn!("⚠️ 没有找到待上传的简历，程序结束");
                return Ok(());
            }
            info!("没有本地简历，直接使用持久存储中的文件");
        } else {
            let report = flow.upload(scope, files).await;
            log_upload_report(&report);
            if report.succeeded.is_empty() && scope == StorageScope::Temporary {
                warn!("⚠️ 所有简历上传失败，程序结束");
                return Ok(());
            }
        }

        // 邮箱同步
        if self.config.trigger_sync {
            if let Err(e) = flow.sync_mailbox().await {
                warn!("⚠️ 邮箱同步失败，继续使用现有文件: {}", e.user_message());
            }
        }

        if scope == StorageScope::Durable {
            flow.ingestion_mut()
                .refresh_durable()
                .await
                .context("获取持久存储文件列表失败")?;
        }
        let file_count = flow.ingestion().names(scope).len();
        log_blocking_wait(file_count);

        let results = flow
            .analyze(&job)
            .await
            .map_err(|e| anyhow::anyhow!(e.user_message()))
            .context("分析失败")?;

        let Some(result) = results.result() else {
            return Ok(());
        };
        print_analysis_summary(result, &self.config.output_log_file);

        let csv = results.export_candidates(None).await?;
        let path = self.write_export(&csv).await?;
        info!("📄 CSV 已保存至: {}", path.display());

        Ok(())
    }

    async fn write_export(&self, csv: &[u8]) -> Result<PathBuf> {
        let folder = Path::new(&self.config.export_folder);
        tokio::fs::create_dir_all(folder)
            .await
            .with_context(|| format!("无法创建导出目录 {}", folder.display()))?;

        let path = folder.join(format!(
            "candidates_{}.csv",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        ));
        tokio::fs::write(&path, csv)
            .await
            .with_context(|| format!("无法写入 {}", path.display()))?;
        Ok(path)
    }
}
