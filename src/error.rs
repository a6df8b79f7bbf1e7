use std::fmt;

use thiserror::Error;

use crate::models::StorageScope;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 客户端校验失败（不会发出网络请求）
    #[error("校验错误: {0}")]
    Validation(#[from] ValidationError),
    /// 远程调用失败，原样保留服务器返回的 detail
    #[error(transparent)]
    Remote(#[from] RemoteError),
    /// 本地状态冲突（不会发出网络请求）
    #[error("状态冲突: {0}")]
    Conflict(#[from] StateConflict),
    /// 删除文件失败，本地集合保持不变
    #[error("删除 {name} 失败 ({scope}): {source}")]
    Delete {
        scope: StorageScope,
        name: String,
        #[source]
        source: RemoteError,
    },
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

impl AppError {
    /// 面向用户展示的错误信息
    ///
    /// 远程错误直接返回服务器的 detail，其余返回完整描述
    pub fn user_message(&self) -> String {
        match self {
            AppError::Remote(e) => e.to_string(),
            AppError::Delete { source, .. } => source.to_string(),
            other => other.to_string(),
        }
    }

    /// 是否为客户端校验错误
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }

    /// 获取内部的远程错误（如果有）
    pub fn as_remote(&self) -> Option<&RemoteError> {
        match self {
            AppError::Remote(e) => Some(e),
            AppError::Delete { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// 单个字段的校验失败
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// 校验错误，携带所有违反规则的字段
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn new() -> Self {
        Self::default()
    }

    /// 只有一个字段出错时的便捷构造
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut err = Self::new();
        err.push(field, message);
        err
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.violations.push(FieldViolation {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// 某个字段是否出错
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }

    /// 没有违规时返回 Ok
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .violations
            .iter()
            .map(|v| format!("{}: {}", v.field, v.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationError {}

/// 远程调用错误
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    /// 服务器返回非 2xx 状态码
    #[error("{}", status_message(.status, .detail))]
    Status {
        endpoint: String,
        status: u16,
        detail: Option<String>,
    },
    /// 网络层失败（连接、超时等）
    #[error("网络请求失败 ({endpoint}): {message}")]
    Transport { endpoint: String, message: String },
    /// 响应体无法解析
    #[error("响应解析失败 ({endpoint}): {message}")]
    Decode { endpoint: String, message: String },
    /// 2xx 但 `success: false`
    #[error("{message}")]
    Rejected { endpoint: String, message: String },
}

impl RemoteError {
    pub fn endpoint(&self) -> &str {
        match self {
            RemoteError::Status { endpoint, .. }
            | RemoteError::Transport { endpoint, .. }
            | RemoteError::Decode { endpoint, .. }
            | RemoteError::Rejected { endpoint, .. } => endpoint,
        }
    }

    /// 服务器提供的 detail（如果有）
    pub fn detail(&self) -> Option<&str> {
        match self {
            RemoteError::Status { detail, .. } => detail.as_deref(),
            RemoteError::Rejected { message, .. } => Some(message),
            _ => None,
        }
    }
}

fn status_message(status: &u16, detail: &Option<String>) -> String {
    match detail {
        Some(detail) => detail.clone(),
        None => format!("请求失败 (HTTP {})", status),
    }
}

/// 本地状态冲突
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateConflict {
    /// 同步已在进行中
    #[error("邮箱同步已在进行中")]
    SyncAlreadyInProgress,
    /// 分析已在进行中
    #[error("分析已在进行中，请等待当前分析完成")]
    AnalysisInFlight,
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件或目录不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// API 地址无效
    #[error("API 地址无效: {url}")]
    InvalidBaseUrl { url: String },
    /// HTTP 客户端构建失败
    #[error("HTTP 客户端构建失败: {message}")]
    ClientBuildFailed { message: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建删除失败错误
    pub fn delete_failed(scope: StorageScope, name: impl Into<String>, source: RemoteError) -> Self {
        AppError::Delete {
            scope,
            name: name.into(),
            source,
        }
    }

    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
