//! 候选人与分析结果
//!
//! 服务器返回的原始结构（`AnalysisResponse` / `RawCandidate`）在这里被规范化为
//! 客户端使用的 `AnalysisResult` / `Candidate`

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// 候选人结论
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Shortlist,
    Review,
    Reject,
}

impl Verdict {
    /// 与服务器约定的字符串
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Shortlist => "shortlist",
            Verdict::Review => "review",
            Verdict::Reject => "reject",
        }
    }

    /// 展示标签
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Shortlist => "Shortlisted",
            Verdict::Review => "Under Review",
            Verdict::Reject => "Rejected",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Verdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "shortlist" => Ok(Verdict::Shortlist),
            "review" => Ok(Verdict::Review),
            "reject" => Ok(Verdict::Reject),
            other => Err(format!("未知的结论: {}", other)),
        }
    }
}

/// 结果筛选条件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerdictFilter {
    #[default]
    All,
    Only(Verdict),
}

impl VerdictFilter {
    pub fn matches(self, verdict: Verdict) -> bool {
        match self {
            VerdictFilter::All => true,
            VerdictFilter::Only(v) => v == verdict,
        }
    }

    /// 导出时使用的 verdict 参数（All 时不带参数）
    pub fn as_verdict(self) -> Option<Verdict> {
        match self {
            VerdictFilter::All => None,
            VerdictFilter::Only(v) => Some(v),
        }
    }
}

impl From<Verdict> for VerdictFilter {
    fn from(v: Verdict) -> Self {
        VerdictFilter::Only(v)
    }
}

impl FromStr for VerdictFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(VerdictFilter::All)
        } else {
            s.parse().map(VerdictFilter::Only)
        }
    }
}

/// 候选人
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub name: String,
    /// 结果集中的唯一键
    pub email: String,
    pub phone: String,
    pub jd_role: String,

    pub jd_similarity: f64,
    pub skills_match: f64,
    pub domain_match: f64,
    pub experience_match: f64,
    pub score: f64,

    pub verdict: Verdict,
    pub fitment: String,
    pub summary_5_lines: String,
    pub highlights: Vec<String>,
    pub red_flags: Vec<String>,
    pub missing_gaps: Vec<String>,
    pub reasons_if_rejected: Vec<String>,
    pub fraud_detected: bool,
    pub recommendation: String,
    pub resume_file: String,

    /// 招聘人员备注（唯一可在本地修改的字段）
    pub recruiter_notes: String,
}

/// 服务器返回的候选人原始结构
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCandidate {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(deserialize_with = "null_as_default")]
    pub jd_role: String,
    #[serde(deserialize_with = "null_as_default")]
    pub jd_similarity: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub skills_match: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub domain_match: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub experience_match: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub score: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub verdict: String,
    #[serde(deserialize_with = "null_as_default")]
    pub fitment: String,
    #[serde(deserialize_with = "null_as_default")]
    pub summary_5_lines: String,
    #[serde(deserialize_with = "null_as_default")]
    pub highlights: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub red_flags: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub missing_gaps: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub reasons_if_rejected: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub fraud_detected: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub recommendation: String,
    #[serde(deserialize_with = "null_as_default")]
    pub resume_file: String,
    #[serde(deserialize_with = "null_as_default")]
    pub recruiter_notes: String,
}

impl RawCandidate {
    /// 转换为 Candidate，无法识别的结论按 review 处理
    fn into_candidate(self) -> Candidate {
        let verdict = self.verdict.parse().unwrap_or_else(|e| {
            warn!("⚠️ 候选人 {} {}，按 review 处理", self.email, e);
            Verdict::Review
        });

        Candidate {
            name: self.name,
            email: self.email,
            phone: self.phone,
            jd_role: self.jd_role,
            jd_similarity: self.jd_similarity,
            skills_match: self.skills_match,
            domain_match: self.domain_match,
            experience_match: self.experience_match,
            score: self.score,
            verdict,
            fitment: self.fitment,
            summary_5_lines: self.summary_5_lines,
            highlights: self.highlights,
            red_flags: self.red_flags,
            missing_gaps: self.missing_gaps,
            reasons_if_rejected: self.reasons_if_rejected,
            fraud_detected: self.fraud_detected,
            recommendation: self.recommendation,
            resume_file: self.resume_file,
            recruiter_notes: self.recruiter_notes,
        }
    }
}

/// 分析指标
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisMetrics {
    pub avg_time_per_resume: Option<f64>,
    pub session_id: Option<String>,
}

/// 分析接口原始响应
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnalysisResponse {
    pub total_processed: Option<u32>,
    pub shortlisted: Option<u32>,
    pub under_review: Option<u32>,
    pub rejected: Option<u32>,
    pub processing_time: Option<f64>,
    pub metrics: Option<AnalysisMetrics>,
    #[serde(deserialize_with = "null_as_default")]
    pub candidates: Vec<RawCandidate>,
}

/// 规范化后的分析结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub total_processed: u32,
    pub shortlisted: u32,
    pub under_review: u32,
    pub rejected: u32,
    /// 处理耗时（秒）
    pub processing_time: f64,
    pub metrics: AnalysisMetrics,
    pub candidates: Vec<Candidate>,
}

impl AnalysisResult {
    /// 某个结论的计数
    pub fn tally(&self, verdict: Verdict) -> u32 {
        match verdict {
            Verdict::Shortlist => self.shortlisted,
            Verdict::Review => self.under_review,
            Verdict::Reject => self.rejected,
        }
    }

    fn tally_mut(&mut self, verdict: Verdict) -> &mut u32 {
        match verdict {
            Verdict::Shortlist => &mut self.shortlisted,
            Verdict::Review => &mut self.under_review,
            Verdict::Reject => &mut self.rejected,
        }
    }

    /// 修改候选人结论，同步调整汇总计数
    ///
    /// 候选人不存在时返回 None
    pub fn move_verdict(&mut self, email: &str, verdict: Verdict) -> Option<Verdict> {
        let candidate = self.candidates.iter_mut().find(|c| c.email == email)?;
        let previous = std::mem::replace(&mut candidate.verdict, verdict);
        if previous != verdict {
            let from = self.tally_mut(previous);
            *from = from.saturating_sub(1);
            *self.tally_mut(verdict) += 1;
        }
        Some(previous)
    }
}

impl AnalysisResponse {
    /// 规范化为 AnalysisResult
    ///
    /// - 候选人按 email 去重（保留第一次出现）
    /// - 缺失的计数由候选人列表推导
    pub fn into_result(self) -> AnalysisResult {
        let mut seen = HashSet::new();
        let mut candidates = Vec::with_capacity(self.candidates.len());

        for raw in self.candidates {
            if !seen.insert(raw.email.clone()) {
                warn!("⚠️ 结果中出现重复的候选人邮箱 {}，已忽略后续记录", raw.email);
                continue;
            }
            candidates.push(raw.into_candidate());
        }

        let count = |v: Verdict| candidates.iter().filter(|c| c.verdict == v).count() as u32;

        AnalysisResult {
            total_processed: self
                .total_processed
                .unwrap_or(candidates.len() as u32),
            shortlisted: self.shortlisted.unwrap_or_else(|| count(Verdict::Shortlist)),
            under_review: self.under_review.unwrap_or_else(|| count(Verdict::Review)),
            rejected: self.rejected.unwrap_or_else(|| count(Verdict::Reject)),
            processing_time: self.processing_time.unwrap_or_default(),
            metrics: self.metrics.unwrap_or_default(),
            candidates,
        }
    }
}

/// 将 JSON null 视为类型默认值
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
