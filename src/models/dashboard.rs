//! 仪表盘聚合数据
//!
//! 服务器返回的结构在不同情况下形状不同（例如没有数据时 `skill_trends` 是 `[]`，
//! 有数据时是对象），这里统一反序列化为确定的类型

use std::fmt;

use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use super::candidate::null_as_default;

/// 分数分布桶
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreBucket {
    #[serde(deserialize_with = "null_as_default")]
    pub range: String,
    pub count: u64,
}

/// 处理指标
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingMetrics {
    pub total_processed: u64,
    pub avg_processing_time: f64,
    pub success_rate: f64,
}

/// 分析聚合数据
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalyticsPayload {
    #[serde(deserialize_with = "null_as_default")]
    pub score_distribution: Vec<ScoreBucket>,
    /// 结论 → 数量（保持服务器返回顺序）
    #[serde(deserialize_with = "labeled_values")]
    pub verdict_breakdown: Vec<(String, f64)>,
    /// 类别 → 平均分（保持服务器返回顺序）
    #[serde(deserialize_with = "labeled_values")]
    pub skill_trends: Vec<(String, f64)>,
    #[serde(deserialize_with = "null_as_default")]
    pub processing_metrics: ProcessingMetrics,
    pub timestamp: Option<String>,
}

/// 最近分析的候选人摘要
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecentAnalysis {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    pub score: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub verdict: String,
}

/// 仪表盘统计
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardStats {
    pub total_candidates: u64,
    pub shortlisted: u64,
    pub under_review: u64,
    pub rejected: u64,
    pub avg_score: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub recent_analyses: Vec<RecentAnalysis>,
    /// 文件格式 → 数量
    #[serde(deserialize_with = "labeled_values")]
    pub format_breakdown: Vec<(String, f64)>,
}

/// 最近活动
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityEntry {
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub timestamp: String,
    pub details: serde_json::Value,
}

/// 图表中的一个点
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

impl ChartPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// 图表序列
pub type ChartSeries = Vec<ChartPoint>;

// 接受 `{"a": 1, "b": 2}`、`[["a", 1]]`、`[]` 或 `null`，按出现顺序返回 (标签, 数值)
fn labeled_values<'de, D>(deserializer: D) -> Result<Vec<(String, f64)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct LabeledValuesVisitor;

    impl<'de> Visitor<'de> for LabeledValuesVisitor {
        type Value = Vec<(String, f64)>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map of label to number, a list of pairs, or null")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut values = Vec::new();
            while let Some((label, value)) = map.next_entry::<String, Option<f64>>()? {
                // 缺失的平均值（NaN 序列化为 null）直接跳过
                if let Some(value) = value {
                    values.push((label, value));
                }
            }
            Ok(values)
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut values = Vec::new();
            while let Some(pair) = seq.next_element::<(String, f64)>()? {
                values.push(pair);
            }
            Ok(values)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(LabeledValuesVisitor)
}
