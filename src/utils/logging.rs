use anyhow::Result;
/// 日志工具模块
///
/// 提供日志初始化和运行时输出的辅助函数
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::{AnalysisResult, UploadReport, Verdict};
use crate::utils::format::{format_score, truncate_text};

/// 初始化 tracing 输出
///
/// 优先使用 `RUST_LOG`，否则 verbose 时为 debug，默认为 info
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub async fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n简历筛选日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    tokio::fs::write(log_file_path, log_header).await?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 简历筛选流程");
    info!("🌐 后端地址: {}", config.api_base_url);
    info!("📄 职位配置: {}", config.job_config_path);
    info!("📁 简历目录: {}", config.resume_folder);
    if config.trigger_sync {
        info!("📬 分析前将触发邮箱同步");
    }
    info!("{}", "=".repeat(60));
}

/// 记录上传结果
pub fn log_upload_report(report: &UploadReport) {
    info!("\n{}", "─".repeat(60));
    info!("📤 上传完成: 成功 {}/{}", report.succeeded.len(), report.total());
    for failure in &report.failed {
        warn!("  ❌ {}: {}", failure.name, failure.error.user_message());
    }
    if let Some(e) = &report.refresh_error {
        warn!("  ⚠️ 持久存储列表未能刷新: {}", e);
    }
    info!("{}", "─".repeat(60));
}

/// 分析前的等待提示（分析没有超时，可能持续较长时间）
pub fn log_blocking_wait(file_count: usize) {
    info!("⏳ 正在分析 {} 份简历，这可能需要几分钟，请勿中断...", file_count);
}

/// 打印分析结果汇总
///
/// # 参数
/// - `result`: 分析结果
/// - `log_file_path`: 日志文件路径
pub fn print_analysis_summary(result: &AnalysisResult, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 分析结果汇总");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("👥 候选人总数: {}", result.total_processed);
    info!("✅ {}: {}", Verdict::Shortlist.label(), result.tally(Verdict::Shortlist));
    info!("🔎 {}: {}", Verdict::Review.label(), result.tally(Verdict::Review));
    info!("❌ {}: {}", Verdict::Reject.label(), result.tally(Verdict::Reject));
    info!("⏱️ 处理耗时: {:.1}s", result.processing_time);
    info!("{}", "─".repeat(60));

    for candidate in result
        .candidates
        .iter()
        .filter(|c| c.verdict == Verdict::Shortlist)
    {
        info!(
            "  ⭐ {} <{}> {} - {}",
            candidate.name,
            candidate.email,
            format_score(Some(candidate.score)),
            truncate_text(&candidate.fitment, 60)
        );
    }

    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}
