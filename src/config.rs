use std::time::Duration;

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 后端 API 地址
    pub api_base_url: String,
    /// 请求超时（秒），None 表示使用 HTTP 客户端默认值
    pub request_timeout_secs: Option<u64>,
    /// 触发同步后首次查询状态前的等待时间（秒）
    pub sync_poll_delay_secs: u64,
    /// 后台刷新同步状态的间隔（秒）
    pub status_refresh_interval_secs: u64,
    /// 职位配置 TOML 文件
    pub job_config_path: String,
    /// 待上传的简历目录
    pub resume_folder: String,
    /// CSV 导出目录
    pub export_folder: String,
    /// 邮件中使用的公司名称
    pub company_name: String,
    /// 分析前是否先触发邮箱同步
    pub trigger_sync: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            request_timeout_secs: None,
            sync_poll_delay_secs: 5,
            status_refresh_interval_secs: 30,
            job_config_path: "job.toml".to_string(),
            resume_folder: "resumes".to_string(),
            export_folder: "exports".to_string(),
            company_name: "Our Company".to_string(),
            trigger_sync: false,
            verbose_logging: false,
            output_log_file: "screening.log".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            api_base_url: std::env::var("API_BASE_URL").unwrap_or(default.api_base_url),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).or(default.request_timeout_secs),
            sync_poll_delay_secs: std::env::var("SYNC_POLL_DELAY_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.sync_poll_delay_secs),
            status_refresh_interval_secs: std::env::var("STATUS_REFRESH_INTERVAL_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.status_refresh_interval_secs),
            job_config_path: std::env::var("JOB_CONFIG_PATH").unwrap_or(default.job_config_path),
            resume_folder: std::env::var("RESUME_FOLDER").unwrap_or(default.resume_folder),
            export_folder: std::env::var("EXPORT_FOLDER").unwrap_or(default.export_folder),
            company_name: std::env::var("COMPANY_NAME").unwrap_or(default.company_name),
            trigger_sync: std::env::var("TRIGGER_SYNC").ok().and_then(|v| v.parse().ok()).unwrap_or(default.trigger_sync),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
        }
    }

    pub fn sync_poll_delay(&self) -> Duration {
        Duration::from_secs(self.sync_poll_delay_secs)
    }

    pub fn status_refresh_interval(&self) -> Duration {
        // interval 不允许 0
        Duration::from_secs(self.status_refresh_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
