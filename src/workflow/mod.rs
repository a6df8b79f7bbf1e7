pub mod screening_flow;
pub mod session_ctx;

pub use screening_flow::ScreeningFlow;
pub use session_ctx::{AnalysisGuard, SessionCtx, View};
