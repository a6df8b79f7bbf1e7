pub mod analysis;
pub mod dashboard;
pub mod ingestion;
pub mod results;
pub mod sync_poller;

pub use analysis::AnalysisTrigger;
pub use dashboard::{DashboardCharts, DashboardService, DashboardView};
pub use ingestion::IngestionManager;
pub use results::{NoteRetryReport, ResultsViewModel, VerdictCounts};
pub use sync_poller::{RefreshHandle, SyncPhase, SyncStatusPoller};
