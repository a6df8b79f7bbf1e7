//! 分析触发服务
//!
//! 校验职位配置后提交给服务器，并把原始响应规范化为 `AnalysisResult`。
//! 重入保护由调用方负责（见 `workflow::SessionCtx`）

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info};

use crate::clients::ScreenerGateway;
use crate::error::AppResult;
use crate::models::{AnalysisResult, AnalyzeRequest, JobConfiguration};

pub struct AnalysisTrigger {
    gateway: Arc<dyn ScreenerGateway>,
}

impl AnalysisTrigger {
    pub fn new(gateway: Arc<dyn ScreenerGateway>) -> Self {
        Self { gateway }
    }

    /// 提交分析
    ///
    /// 校验失败时返回 `AppError::Validation`，不发出任何请求。
    /// 服务器返回的错误详情原样透传
    pub async fn analyze(&self, config: &JobConfiguration) -> AppResult<AnalysisResult> {
        config.validate()?;

        let request = AnalyzeRequest::from(config);
        let source = if request.load_from_blob {
            "持久存储"
        } else {
            "临时存储"
        };
        info!(
            "🔍 提交分析: 职位 {}，简历来源 {}",
            config.role.as_deref().unwrap_or("未指定"),
            source
        );
        debug!("分析阈值: {:?}", config.thresholds());

        let started = Instant::now();
        let response = match self.gateway.analyze(&request).await {
            Ok(response) => response,
            Err(e) => {
                error!("❌ 分析失败: {}", e);
                return Err(e);
            }
        };

        let result = response.into_result();
        info!(
            "✓ 分析完成: 共 {} 人 (入围 {} / 待定 {} / 淘汰 {})，耗时 {:.1}s",
            result.total_processed,
            result.shortlisted,
            result.under_review,
            result.rejected,
            started.elapsed().as_secs_f64()
        );

        Ok(result)
    }
}
