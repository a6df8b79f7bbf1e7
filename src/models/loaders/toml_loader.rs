use std::path::Path;

use tokio::fs;

use crate::error::{AppError, AppResult, FileError};
use crate::models::job::JobConfiguration;

/// 从 TOML 文件加载职位配置
///
/// 只做解析，不做校验；校验在提交分析前进行
pub async fn load_job_config(toml_file_path: &Path) -> AppResult<JobConfiguration> {
    let path_str = toml_file_path.display().to_string();

    if !toml_file_path.exists() {
        return Err(FileError::NotFound { path: path_str }.into());
    }

    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|e| AppError::file_read_failed(&path_str, e))?;

    let config: JobConfiguration =
        toml::from_str(&content).map_err(|source| FileError::TomlParseFailed {
            path: path_str.clone(),
            source,
        })?;

    tracing::info!(
        "已加载职位配置: {} (JD {} 字符, 来源: {})",
        path_str,
        config.jd.chars().count(),
        if config.load_from_blob { "持久存储" } else { "临时上传" }
    );

    Ok(config)
}
