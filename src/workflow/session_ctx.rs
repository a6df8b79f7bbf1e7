//! 会话上下文
//!
//! 封装"当前在哪个视图、是否有分析正在进行"这一共享状态

use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{AppResult, StateConflict};

/// 当前视图
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// 配置与上传
    #[default]
    Screener,
    /// 分析结果
    Results,
    /// 仪表盘
    Dashboard,
}

impl View {
    pub fn name(self) -> &'static str {
        match self {
            View::Screener => "筛选",
            View::Results => "结果",
            View::Dashboard => "仪表盘",
        }
    }
}

/// 会话上下文
///
/// 克隆后共享同一份状态
#[derive(Debug, Clone, Default)]
pub struct SessionCtx {
    view: Arc<Mutex<View>>,
    analysis_in_flight: Arc<AtomicBool>,
    session_id: Arc<Mutex<Option<String>>>,
}

/// 分析进行中的标记，丢弃时释放
#[derive(Debug)]
pub struct AnalysisGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for AnalysisGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl SessionCtx {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> View {
        self.view.lock().map(|v| *v).unwrap_or_default()
    }

    pub fn set_view(&self, view: View) {
        if let Ok(mut current) = self.view.lock() {
            *current = view;
        }
    }

    pub fn is_analyzing(&self) -> bool {
        self.analysis_in_flight.load(Ordering::Acquire)
    }

    /// 标记分析开始，已有分析进行中时返回 `AnalysisInFlight`
    pub fn begin_analysis(&self) -> AppResult<AnalysisGuard> {
        self.analysis_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| StateConflict::AnalysisInFlight)?;
        Ok(AnalysisGuard {
            flag: self.analysis_in_flight.clone(),
        })
    }

    /// 最近一次分析的会话 ID
    pub fn session_id(&self) -> Option<String> {
        self.session_id.lock().ok().and_then(|id| id.clone())
    }

    pub fn set_session_id(&self, id: Option<String>) {
        if let Ok(mut current) = self.session_id.lock() {
            *current = id;
        }
    }
}

impl Display for SessionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[会话 {} 视图 {}]",
            self.session_id().as_deref().unwrap_or("-"),
            self.view().name()
        )
    }
}
