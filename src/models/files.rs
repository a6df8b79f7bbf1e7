use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// 简历集合的存储范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageScope {
    /// 临时存储：仅本次会话，客户端为准
    Temporary,
    /// 持久存储：服务器共享集合，服务器为准
    Durable,
}

impl StorageScope {
    pub fn name(self) -> &'static str {
        match self {
            StorageScope::Temporary => "临时存储",
            StorageScope::Durable => "持久存储",
        }
    }
}

impl std::fmt::Display for StorageScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 已入库的简历文件
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IngestedFile {
    pub name: String,
    pub scope: StorageScope,
}

/// 待上传的简历文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ResumeFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// 单个文件上传失败
#[derive(Debug)]
pub struct UploadFailure {
    pub name: String,
    pub error: AppError,
}

/// 批量上传结果：成功与失败的划分
#[derive(Debug, Default)]
pub struct UploadReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<UploadFailure>,
    /// 上传后重新拉取持久存储列表失败时记录（不影响上传结果本身）
    pub refresh_error: Option<AppError>,
}

impl UploadReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    /// 失败文件名列表
    pub fn failed_names(&self) -> Vec<&str> {
        self.failed.iter().map(|f| f.name.as_str()).collect()
    }
}

/// 删除结果
///
/// 能拿到这个值说明远程删除已经成功
#[derive(Debug, Default)]
pub struct DeleteReport {
    /// 删除后重新拉取持久存储列表失败时记录
    pub refresh_error: Option<AppError>,
}

/// 上传进度（每个文件完成后报告一次，单调递增）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadProgress {
    pub completed: usize,
    pub total: usize,
    pub name: String,
    pub ok: bool,
}
