use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::{AppError, AppResult, FileError};
use crate::models::files::ResumeFile;

/// 支持的简历扩展名
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["pdf", "docx", "doc"];

/// 是否为支持的简历文件（按扩展名，不区分大小写）
pub fn is_supported_resume(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

/// 从文件夹中加载所有简历文件
///
/// 不支持的文件会被跳过并记录日志；返回结果按文件名排序，保证上传顺序稳定
pub async fn load_resume_files(folder_path: &str) -> AppResult<Vec<ResumeFile>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        return Err(FileError::NotFound {
            path: folder_path.to_string(),
        }
        .into());
    }

    let mut paths = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .map_err(|e| AppError::file_read_failed(folder_path, e))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AppError::file_read_failed(folder_path, e))?
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        if is_supported_resume(&name) {
            paths.push((name, path));
        } else {
            tracing::debug!("跳过不支持的文件: {}", name);
        }
    }

    paths.sort_by(|a, b| a.0.cmp(&b.0));

    let mut files = Vec::with_capacity(paths.len());
    for (name, path) in paths {
        let bytes = fs::read(&path)
            .await
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        tracing::info!("正在加载: {} ({} 字节)", name, bytes.len());
        files.push(ResumeFile::new(name, bytes));
    }

    Ok(files)
}
