pub mod candidate;
pub mod dashboard;
pub mod files;
pub mod job;
pub mod loaders;
pub mod sync;

pub use candidate::{AnalysisMetrics, AnalysisResponse, AnalysisResult, Candidate, Verdict, VerdictFilter};
pub use dashboard::{
    ActivityEntry, AnalyticsPayload, ChartPoint, ChartSeries, DashboardStats, ScoreBucket,
};
pub use files::{IngestedFile, ResumeFile, StorageScope, UploadFailure, UploadProgress, UploadReport, DeleteReport};
pub use job::{AnalyzeRequest, ExperienceRange, JobConfiguration};
pub use loaders::{load_job_config, load_resume_files};
pub use sync::{SyncHistory, SyncStatus};
