//! 邮箱同步状态轮询
//!
//! 同步是服务器端的长任务，客户端只负责触发并在固定延迟后查询一次状态。
//! 状态通过 watch 通道发布，其他组件只读

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::clients::ScreenerGateway;
use crate::error::{AppResult, StateConflict};
use crate::models::{SyncHistory, SyncStatus};

/// 默认的触发后等待时间
pub const DEFAULT_POLL_DELAY: Duration = Duration::from_secs(5);

/// 轮询器所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    /// 已发出触发请求，等待确认
    Triggering,
    /// 触发已确认，等待延迟后查询状态
    Polling,
}

struct PollerInner {
    gateway: Arc<dyn ScreenerGateway>,
    phase: Mutex<SyncPhase>,
    status_tx: watch::Sender<SyncStatus>,
    poll_delay: Duration,
}

/// 同步状态轮询器
///
/// 可以廉价克隆，所有克隆共享同一个阶段与状态
#[derive(Clone)]
pub struct SyncStatusPoller {
    inner: Arc<PollerInner>,
}

/// 阶段守卫：离开作用域时（包括 future 被丢弃）回到 Idle
struct PhaseGuard<'a> {
    phase: &'a Mutex<SyncPhase>,
}

impl PhaseGuard<'_> {
    fn set(&self, next: SyncPhase) {
        *lock_phase(self.phase) = next;
    }
}

/// 阶段只是一个枚举值，锁中毒后内容仍然有效
fn lock_phase(phase: &Mutex<SyncPhase>) -> MutexGuard<'_, SyncPhase> {
    phase.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.set(SyncPhase::Idle);
    }
}

impl SyncStatusPoller {
    pub fn new(gateway: Arc<dyn ScreenerGateway>) -> Self {
        Self::with_delay(gateway, DEFAULT_POLL_DELAY)
    }

    pub fn with_delay(gateway: Arc<dyn ScreenerGateway>, poll_delay: Duration) -> Self {
        let (status_tx, _) = watch::channel(SyncStatus::default());
        Self {
            inner: Arc::new(PollerInner {
                gateway,
                phase: Mutex::new(SyncPhase::Idle),
                status_tx,
                poll_delay,
            }),
        }
    }

    pub fn phase(&self) -> SyncPhase {
        *lock_phase(&self.inner.phase)
    }

    pub fn is_syncing(&self) -> bool {
        self.phase() != SyncPhase::Idle
    }

    /// 最近一次发布的状态
    pub fn status(&self) -> SyncStatus {
        self.inner.status_tx.borrow().clone()
    }

    /// 订阅状态变化
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.inner.status_tx.subscribe()
    }

    /// 触发一次同步
    ///
    /// 流程：触发 → 等待固定延迟 → 查询一次状态 → 回到 Idle。
    /// 已有同步在进行时直接返回 `SyncAlreadyInProgress`，不会发出请求
    pub async fn trigger_sync(&self) -> AppResult<SyncStatus> {
        let guard = self.enter()?;

        info!("📬 触发邮箱同步");
        self.inner.gateway.trigger_sync().await?;

        guard.set(SyncPhase::Polling);
        debug!("等待 {:?} 后查询同步状态", self.inner.poll_delay);
        tokio::time::sleep(self.inner.poll_delay).await;

        let status = self.inner.gateway.sync_status().await?;
        self.publish(status.clone());

        info!(
            "✓ 同步状态: 处理邮件 {}，上传文件 {}，最后同步 {}",
            status.emails_processed,
            status.files_uploaded,
            status.last_sync_label()
        );
        for err in &status.errors {
            warn!("⚠️ 同步错误: {}", err);
        }

        drop(guard);
        Ok(status)
    }

    /// 查询并发布当前状态（不改变阶段）
    pub async fn refresh_status(&self) -> AppResult<SyncStatus> {
        let status = self.inner.gateway.sync_status().await?;
        self.publish(status.clone());
        Ok(status)
    }

    pub async fn history(&self) -> AppResult<SyncHistory> {
        self.inner.gateway.sync_history().await
    }

    /// 请求服务器开启自动同步，返回服务器消息
    pub async fn start_auto_sync(&self) -> AppResult<String> {
        let message = self.inner.gateway.start_auto_sync().await?;
        info!("自动同步: {}", message);
        Ok(message)
    }

    /// 启动后台定时刷新（首次立即执行）
    ///
    /// 返回的句柄被取消或丢弃时任务终止
    pub fn spawn_background_refresh(&self, every: Duration) -> RefreshHandle {
        let poller = self.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                if let Err(e) = poller.refresh_status().await {
                    warn!("⚠️ 后台刷新同步状态失败: {}", e);
                }
            }
        });
        RefreshHandle {
            handle: Some(handle),
        }
    }

    fn enter(&self) -> AppResult<PhaseGuard<'_>> {
        let mut phase = lock_phase(&self.inner.phase);
        if *phase != SyncPhase::Idle {
            return Err(StateConflict::SyncAlreadyInProgress.into());
        }
        *phase = SyncPhase::Triggering;
        Ok(PhaseGuard {
            phase: &self.inner.phase,
        })
    }

    fn publish(&self, status: SyncStatus) {
        self.inner.status_tx.send_replace(status);
    }
}

/// 后台刷新任务句柄
pub struct RefreshHandle {
    handle: Option<JoinHandle<()>>,
}

impl RefreshHandle {
    pub fn cancel(mut self) {
        self.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    fn abort(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.abort();
    }
}
