//! 职位配置
//!
//! 一次分析提交所需的全部输入：JD 文本、阈值、简历来源

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// JD 文本最少字符数（去除首尾空白后）
pub const MIN_JD_LENGTH: usize = 50;

/// 技能列表最多条目数
pub const MAX_SKILLS: usize = 20;

/// 经验区间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExperienceRange {
    #[default]
    #[serde(rename = "0–1 yrs")]
    ZeroToOne,
    #[serde(rename = "1–3 yrs")]
    OneToThree,
    #[serde(rename = "2–4 yrs")]
    TwoToFour,
    #[serde(rename = "4+ yrs")]
    FourPlus,
}

impl ExperienceRange {
    /// 获取展示标签（与服务器约定的字符串一致）
    pub fn label(self) -> &'static str {
        match self {
            ExperienceRange::ZeroToOne => "0–1 yrs",
            ExperienceRange::OneToThree => "1–3 yrs",
            ExperienceRange::TwoToFour => "2–4 yrs",
            ExperienceRange::FourPlus => "4+ yrs",
        }
    }
}

impl std::fmt::Display for ExperienceRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 职位配置
///
/// `shortlist_threshold > reject_threshold` 不由类型保证，提交前由 [`JobConfiguration::validate`] 检查
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfiguration {
    /// 职位描述
    pub jd: String,
    /// 职位名称（为空时由服务器从 JD 中提取）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// 领域
    #[serde(default)]
    pub domain: String,
    /// 逗号分隔的技能列表
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub experience_range: ExperienceRange,

    #[serde(default = "default_jd_threshold")]
    pub jd_threshold: i32,
    #[serde(default = "default_skills_threshold")]
    pub skills_threshold: i32,
    #[serde(default = "default_domain_threshold")]
    pub domain_threshold: i32,
    #[serde(default = "default_experience_threshold")]
    pub experience_threshold: i32,
    #[serde(default = "default_shortlist_threshold")]
    pub shortlist_threshold: i32,
    #[serde(default = "default_reject_threshold")]
    pub reject_threshold: i32,

    /// 只保留前 N 名（0 表示不限制）
    #[serde(default)]
    pub top_n: u32,

    /// true = 使用持久存储中的简历，false = 使用本次会话上传的简历
    ///
    /// 不属于服务器的 job_config 结构，提交时作为请求的独立字段发送
    #[serde(default = "default_load_from_blob", skip_serializing)]
    pub load_from_blob: bool,
}

fn default_jd_threshold() -> i32 {
    60
}
fn default_skills_threshold() -> i32 {
    65
}
fn default_domain_threshold() -> i32 {
    50
}
fn default_experience_threshold() -> i32 {
    55
}
fn default_shortlist_threshold() -> i32 {
    75
}
fn default_reject_threshold() -> i32 {
    40
}
fn default_load_from_blob() -> bool {
    true
}

impl JobConfiguration {
    /// 使用默认阈值创建配置
    pub fn new(jd: impl Into<String>) -> Self {
        Self {
            jd: jd.into(),
            role: None,
            domain: String::new(),
            skills: String::new(),
            experience_range: ExperienceRange::default(),
            jd_threshold: default_jd_threshold(),
            skills_threshold: default_skills_threshold(),
            domain_threshold: default_domain_threshold(),
            experience_threshold: default_experience_threshold(),
            shortlist_threshold: default_shortlist_threshold(),
            reject_threshold: default_reject_threshold(),
            top_n: 0,
            load_from_blob: default_load_from_blob(),
        }
    }

    /// 解析技能列表（去除空白和空项）
    pub fn skill_list(&self) -> Vec<&str> {
        self.skills
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// 六个阈值（字段名, 值）
    pub fn thresholds(&self) -> [(&'static str, i32); 6] {
        [
            ("jd_threshold", self.jd_threshold),
            ("skills_threshold", self.skills_threshold),
            ("domain_threshold", self.domain_threshold),
            ("experience_threshold", self.experience_threshold),
            ("shortlist_threshold", self.shortlist_threshold),
            ("reject_threshold", self.reject_threshold),
        ]
    }

    /// 提交前校验
    ///
    /// 返回所有违反规则的字段，而不是遇到第一个就停止
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut err = ValidationError::new();

        if self.jd.trim().chars().count() < MIN_JD_LENGTH {
            err.push(
                "jd",
                format!("Job description must be at least {} characters", MIN_JD_LENGTH),
            );
        }

        if self.skill_list().len() > MAX_SKILLS {
            err.push("skills", format!("Maximum {} skills allowed", MAX_SKILLS));
        }

        for (field, value) in self.thresholds() {
            if !(0..=100).contains(&value) {
                err.push(field, "Value must be between 0 and 100");
            }
        }

        if self.shortlist_threshold <= self.reject_threshold {
            err.push(
                "shortlist_threshold",
                "Shortlist threshold must be higher than reject threshold",
            );
        }

        err.into_result()
    }
}

/// 分析请求体
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeRequest<'a> {
    pub job_config: &'a JobConfiguration,
    pub load_from_blob: bool,
}

impl<'a> From<&'a JobConfiguration> for AnalyzeRequest<'a> {
    fn from(config: &'a JobConfiguration) -> Self {
        Self {
            job_config: config,
            load_from_blob: config.load_from_blob,
        }
    }
}
