use serde::{Deserialize, Serialize};

use super::candidate::null_as_default;

/// 邮箱同步状态
///
/// 只由同步轮询器修改，其他组件只读
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncStatus {
    pub is_active: bool,
    pub emails_processed: u64,
    pub files_uploaded: u64,
    /// None 表示从未同步
    pub last_sync: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub errors: Vec<String>,
}

impl SyncStatus {
    pub fn never_synced(&self) -> bool {
        self.last_sync.is_none()
    }

    /// 展示用的最后同步时间
    pub fn last_sync_label(&self) -> &str {
        self.last_sync.as_deref().unwrap_or("Never")
    }
}

/// 同步历史
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncHistory {
    pub last_sync: Option<String>,
    pub total_emails_processed: u64,
    pub total_files_uploaded: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub recent_errors: Vec<String>,
}
