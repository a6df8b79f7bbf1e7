//! 仪表盘数据转换
//!
//! 纯函数把聚合接口的数据转换为图表序列；数据缺失时返回空序列，不报错

use std::sync::Arc;

use tracing::{debug, info};

use crate::clients::ScreenerGateway;
use crate::error::AppResult;
use crate::models::{ActivityEntry, AnalyticsPayload, ChartPoint, ChartSeries, DashboardStats};
use crate::utils::format::{capitalize, title_case};

/// 三个图表序列
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardCharts {
    pub score_distribution: ChartSeries,
    pub verdict_breakdown: ChartSeries,
    pub skill_trends: ChartSeries,
}

impl DashboardCharts {
    pub fn is_empty(&self) -> bool {
        self.score_distribution.is_empty()
            && self.verdict_breakdown.is_empty()
            && self.skill_trends.is_empty()
    }
}

/// 分数分布：区间 → 人数
pub fn score_distribution_series(payload: &AnalyticsPayload) -> ChartSeries {
    payload
        .score_distribution
        .iter()
        .map(|bucket| ChartPoint::new(bucket.range.as_str(), bucket.count as f64))
        .collect()
}

/// 结论分布：`shortlist` → `Shortlist`
pub fn verdict_breakdown_series(payload: &AnalyticsPayload) -> ChartSeries {
    payload
        .verdict_breakdown
        .iter()
        .map(|(verdict, count)| ChartPoint::new(capitalize(verdict), *count))
        .collect()
}

/// 类别平均分：`data_analysis` → `Data Analysis`，数值取整
pub fn skill_trend_series(payload: &AnalyticsPayload) -> ChartSeries {
    payload
        .skill_trends
        .iter()
        .map(|(category, avg)| ChartPoint::new(title_case(category), avg.round()))
        .collect()
}

pub fn transform(payload: &AnalyticsPayload) -> DashboardCharts {
    DashboardCharts {
        score_distribution: score_distribution_series(payload),
        verdict_breakdown: verdict_breakdown_series(payload),
        skill_trends: skill_trend_series(payload),
    }
}

/// 展示用的活动记录
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityItem {
    /// `resume_upload` → `Resume Upload`
    pub title: String,
    pub timestamp: String,
    pub details: serde_json::Value,
}

impl From<&ActivityEntry> for ActivityItem {
    fn from(entry: &ActivityEntry) -> Self {
        Self {
            title: title_case(&entry.kind),
            timestamp: entry.timestamp.clone(),
            details: entry.details.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardView {
    pub stats: DashboardStats,
    pub charts: DashboardCharts,
    pub activity: Vec<ActivityItem>,
}

pub struct DashboardService {
    gateway: Arc<dyn ScreenerGateway>,
}

impl DashboardService {
    pub fn new(gateway: Arc<dyn ScreenerGateway>) -> Self {
        Self { gateway }
    }

    /// 并发拉取统计、分析数据和最近活动
    pub async fn load(&self) -> AppResult<DashboardView> {
        let (stats, analytics, activity) = futures::try_join!(
            self.gateway.dashboard_stats(),
            self.gateway.dashboard_analytics(),
            self.gateway.recent_activity(),
        )?;

        let charts = transform(&analytics);
        debug!(
            "图表数据: 分数区间 {}，结论 {}，类别 {}",
            charts.score_distribution.len(),
            charts.verdict_breakdown.len(),
            charts.skill_trends.len()
        );
        info!(
            "📊 仪表盘已加载: 候选人 {}，最近活动 {}",
            stats.total_candidates,
            activity.len()
        );

        Ok(DashboardView {
            stats,
            charts,
            activity: activity.iter().map(ActivityItem::from).collect(),
        })
    }
}
