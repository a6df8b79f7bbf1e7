//! 分析结果视图模型
//!
//! 持有一次分析的结果，提供筛选、备注、导出和邮件等操作。
//! 备注采用乐观更新：先改本地，再提交服务器；提交失败时保留本地值，
//! 记入待同步队列，由调用方显式调用 `retry_pending_notes` 重试

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::clients::gateway::{BulkEmailRequest, CandidateUpdate, EmailMessage};
use crate::clients::ScreenerGateway;
use crate::error::{AppError, AppResult, ValidationError};
use crate::models::{AnalysisResult, Candidate, Verdict, VerdictFilter};
use crate::utils::format::is_valid_email;

/// 各结论的人数（用于筛选栏）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerdictCounts {
    pub all: usize,
    pub shortlist: usize,
    pub review: usize,
    pub reject: usize,
}

impl VerdictCounts {
    pub fn get(&self, filter: VerdictFilter) -> usize {
        match filter {
            VerdictFilter::All => self.all,
            VerdictFilter::Only(Verdict::Shortlist) => self.shortlist,
            VerdictFilter::Only(Verdict::Review) => self.review,
            VerdictFilter::Only(Verdict::Reject) => self.reject,
        }
    }
}

/// 重试待同步备注的结果
#[derive(Debug, Default)]
pub struct NoteRetryReport {
    pub synced: Vec<String>,
    pub failed: Vec<(String, AppError)>,
}

/// 根据候选人结论生成面试邀请邮件
pub fn compose_candidate_email(candidate: &Candidate) -> EmailMessage {
    let role = if candidate.jd_role.trim().is_empty() {
        "Position"
    } else {
        candidate.jd_role.trim()
    };

    let body = match candidate.verdict {
        Verdict::Shortlist => format!(
            "Dear {},\n\nCongratulations! We are pleased to inform you that you have been shortlisted for the next round.\n\nBest regards,\nRecruitment Team",
            candidate.name
        ),
        Verdict::Review | Verdict::Reject => format!(
            "Dear {},\n\nThank you for your interest. We will review your application and get back to you.\n\nBest regards,\nRecruitment Team",
            candidate.name
        ),
    };

    EmailMessage {
        email: candidate.email.clone(),
        subject: format!("Interview Opportunity - {}", role),
        body,
    }
}

pub struct ResultsViewModel {
    gateway: Arc<dyn ScreenerGateway>,
    result: Option<AnalysisResult>,
    /// email → 尚未同步到服务器的备注
    pending_note_syncs: BTreeMap<String, String>,
}

impl ResultsViewModel {
    pub fn new(gateway: Arc<dyn ScreenerGateway>, result: AnalysisResult) -> Self {
        Self {
            gateway,
            result: Some(result),
            pending_note_syncs: BTreeMap::new(),
        }
    }

    /// 没有结果的状态（例如页面刷新后）
    pub fn empty(gateway: Arc<dyn ScreenerGateway>) -> Self {
        Self {
            gateway,
            result: None,
            pending_note_syncs: BTreeMap::new(),
        }
    }

    pub fn has_result(&self) -> bool {
        self.result.is_some()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn candidates(&self) -> &[Candidate] {
        self.result
            .as_ref()
            .map(|r| r.candidates.as_slice())
            .unwrap_or(&[])
    }

    pub fn candidate(&self, email: &str) -> Option<&Candidate> {
        self.candidates().iter().find(|c| c.email == email)
    }

    /// 按结论筛选，保持原有顺序
    pub fn filter_by(&self, filter: VerdictFilter) -> Vec<&Candidate> {
        self.candidates()
            .iter()
            .filter(|c| filter.matches(c.verdict))
            .collect()
    }

    pub fn verdict_counts(&self) -> VerdictCounts {
        self.candidates()
            .iter()
            .fold(VerdictCounts::default(), |mut counts, c| {
                counts.all += 1;
                match c.verdict {
                    Verdict::Shortlist => counts.shortlist += 1,
                    Verdict::Review => counts.review += 1,
                    Verdict::Reject => counts.reject += 1,
                }
                counts
            })
    }

    /// 更新招聘人员备注
    ///
    /// 本地立即生效；服务器提交失败时返回错误，本地值保留并记入待同步队列
    pub async fn update_notes(&mut self, email: &str, notes: &str) -> AppResult<()> {
        let candidate = self.candidate_mut(email)?;
        candidate.recruiter_notes = notes.to_string();

        let update = CandidateUpdate::notes(email, notes);
        match self.gateway.update_candidate(&update).await {
            Ok(()) => {
                self.pending_note_syncs.remove(email);
                info!("📝 备注已保存: {}", email);
                Ok(())
            }
            Err(e) => {
                warn!("⚠️ 备注同步失败，已保留本地修改: {}: {}", email, e);
                self.pending_note_syncs
                    .insert(email.to_string(), notes.to_string());
                Err(e)
            }
        }
    }

    /// 尚未同步到服务器的备注（按邮箱排序）
    pub fn pending_note_syncs(&self) -> Vec<&str> {
        self.pending_note_syncs.keys().map(String::as_str).collect()
    }

    /// 重新提交所有待同步的备注
    pub async fn retry_pending_notes(&mut self) -> NoteRetryReport {
        let pending = std::mem::take(&mut self.pending_note_syncs);
        let mut report = NoteRetryReport::default();

        for (email, notes) in pending {
            let update = CandidateUpdate::notes(email.as_str(), notes.as_str());
            match self.gateway.update_candidate(&update).await {
                Ok(()) => report.synced.push(email),
                Err(e) => {
                    self.pending_note_syncs.insert(email.clone(), notes);
                    report.failed.push((email, e));
                }
            }
        }

        if !report.synced.is_empty() || !report.failed.is_empty() {
            info!(
                "备注重试: 成功 {}，仍失败 {}",
                report.synced.len(),
                report.failed.len()
            );
        }
        report
    }

    /// 人工修改结论
    ///
    /// 先提交服务器，成功后才修改本地
    pub async fn override_verdict(&mut self, email: &str, verdict: Verdict) -> AppResult<()> {
        self.candidate_mut(email)?;

        self.gateway
            .update_candidate(&CandidateUpdate::verdict(email, verdict))
            .await?;

        let previous = self
            .result
            .as_mut()
            .and_then(|r| r.move_verdict(email, verdict))
            .ok_or_else(|| not_found(email))?;
        info!("✓ 结论已修改: {} {} → {}", email, previous, verdict);
        Ok(())
    }

    /// 导出 CSV（None 表示全部）
    pub async fn export_candidates(&self, verdict: Option<Verdict>) -> AppResult<Vec<u8>> {
        let bytes = self.gateway.export_csv(verdict).await?;
        info!(
            "📄 已导出 {} CSV ({} 字节)",
            verdict.map(|v| v.as_str()).unwrap_or("all"),
            bytes.len()
        );
        Ok(bytes)
    }

    /// 下载候选人摘要（PDF）
    pub async fn download_summary(&self, email: &str) -> AppResult<Vec<u8>> {
        self.gateway.candidate_summary(email).await
    }

    /// 给单个候选人发送邮件
    pub async fn email_candidate(&self, candidate: &Candidate) -> AppResult<()> {
        if !is_valid_email(&candidate.email) {
            return Err(ValidationError::single("email", "Invalid email address").into());
        }

        let message = compose_candidate_email(candidate);
        self.gateway.send_email(&message).await?;
        info!("✉️ 邮件已发送: {}", candidate.email);
        Ok(())
    }

    /// 批量发送邮件（一次请求，由服务器套用模板）
    pub async fn bulk_email(
        &self,
        emails: &[String],
        verdict: Verdict,
        role: &str,
        company: &str,
    ) -> AppResult<()> {
        let mut err = ValidationError::new();
        if emails.is_empty() {
            err.push("candidate_emails", "No candidates selected");
        }
        for email in emails.iter().filter(|e| !is_valid_email(e)) {
            err.push("candidate_emails", format!("Invalid email address: {}", email));
        }
        err.into_result()?;

        let request = BulkEmailRequest {
            candidate_emails: emails.to_vec(),
            verdict,
            role: role.to_string(),
            company_name: company.to_string(),
        };
        self.gateway.send_bulk_email(&request).await?;
        info!("✉️ 批量邮件已发送: {} 人 ({})", emails.len(), verdict);
        Ok(())
    }

    fn candidate_mut(&mut self, email: &str) -> AppResult<&mut Candidate> {
        self.result
            .as_mut()
            .and_then(|r| r.candidates.iter_mut().find(|c| c.email == email))
            .ok_or_else(|| not_found(email))
    }
}

fn not_found(email: &str) -> AppError {
    ValidationError::single("email", format!("Candidate not found: {}", email)).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::fake::FakeGateway;
    use crate::models::AnalysisResponse;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    fn sample_result() -> AnalysisResult {
        let response: AnalysisResponse = serde_json::from_value(json!({
            "candidates": [
                {"name": "Ann", "email": "ann@x.com", "jd_role": "Data Engineer", "score": 86.0, "verdict": "shortlist"},
                {"name": "Bob", "email": "bob@x.com", "score": 58.0, "verdict": "review"},
                {"name": "Cid", "email": "cid@x.com", "score": 31.0, "verdict": "reject"}
            ]
        }))
        .unwrap();
        response.into_result()
    }

    fn view(gateway: &Arc<FakeGateway>) -> ResultsViewModel {
        ResultsViewModel::new(gateway.clone(), sample_result())
    }

    #[test]
    fn test_filter_preserves_order() {
        let gateway = Arc::new(FakeGateway::new());
        let view = view(&gateway);

        let all: Vec<&str> = view
            .filter_by(VerdictFilter::All)
            .iter()
            .map(|c| c.email.as_str())
            .collect();
        assert_eq!(all, vec!["ann@x.com", "bob@x.com", "cid@x.com"]);

        let shortlisted = view.filter_by(VerdictFilter::Only(Verdict::Shortlist));
        assert_eq!(shortlisted.len(), 1);
        assert_eq!(shortlisted[0].email, "ann@x.com");

        let counts = view.verdict_counts();
        assert_eq!(counts.get(VerdictFilter::All), 3);
        assert_eq!(counts.get(VerdictFilter::Only(Verdict::Reject)), 1);
    }

    #[test]
    fn test_empty_state() {
        let gateway = Arc::new(FakeGateway::new());
        let view = ResultsViewModel::empty(gateway);

        assert!(!view.has_result());
        assert!(view.filter_by(VerdictFilter::All).is_empty());
        assert_eq!(view.verdict_counts(), VerdictCounts::default());
    }

    #[tokio::test]
    async fn test_update_notes_success() {
        let gateway = Arc::new(FakeGateway::new());
        let mut view = view(&gateway);

        assert_ok!(view.update_notes("bob@x.com", "Call on Monday").await);

        assert_eq!(view.candidate("bob@x.com").unwrap().recruiter_notes, "Call on Monday");
        // 其他候选人的备注不受影响
        assert_eq!(view.candidate("ann@x.com").unwrap().recruiter_notes, "");
        assert_eq!(view.candidate("cid@x.com").unwrap().recruiter_notes, "");
        let updates = gateway.updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].candidate_id, "bob@x.com");
        assert_eq!(updates[0].recruiter_notes.as_deref(), Some("Call on Monday"));
        assert!(view.pending_note_syncs().is_empty());
    }

    #[tokio::test]
    async fn test_update_notes_failure_keeps_local_value() {
        let gateway = Arc::new(FakeGateway::new());
        *gateway.fail_updates.lock().unwrap() = true;
        let mut view = view(&gateway);

        let err = view.update_notes("ann@x.com", "Strong SQL").await.unwrap_err();

        assert_eq!(err.to_string(), "Candidate not found");
        assert_eq!(view.candidate("ann@x.com").unwrap().recruiter_notes, "Strong SQL");
        assert_eq!(view.pending_note_syncs(), vec!["ann@x.com"]);
        // 不自动重试
        assert_eq!(gateway.count("update"), 1);
    }

    #[tokio::test]
    async fn test_retry_pending_notes() {
        let gateway = Arc::new(FakeGateway::new());
        *gateway.fail_updates.lock().unwrap() = true;
        let mut view = view(&gateway);
        assert_err!(view.update_notes("ann@x.com", "first").await);
        assert_err!(view.update_notes("cid@x.com", "second").await);

        let report = view.retry_pending_notes().await;
        assert_eq!(report.failed.len(), 2);
        assert_eq!(view.pending_note_syncs().len(), 2);

        *gateway.fail_updates.lock().unwrap() = false;
        let report = view.retry_pending_notes().await;
        assert_eq!(report.synced, vec!["ann@x.com", "cid@x.com"]);
        assert!(view.pending_note_syncs().is_empty());
    }

    #[tokio::test]
    async fn test_later_success_clears_pending() {
        let gateway = Arc::new(FakeGateway::new());
        *gateway.fail_updates.lock().unwrap() = true;
        let mut view = view(&gateway);
        assert_err!(view.update_notes("ann@x.com", "draft").await);

        *gateway.fail_updates.lock().unwrap() = false;
        assert_ok!(view.update_notes("ann@x.com", "final").await);

        assert!(view.pending_note_syncs().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_candidate_is_validation_error() {
        let gateway = Arc::new(FakeGateway::new());
        let mut view = view(&gateway);

        let err = view.update_notes("nobody@x.com", "x").await.unwrap_err();

        assert!(err.is_validation());
        assert_eq!(gateway.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_override_verdict_not_optimistic() {
        let gateway = Arc::new(FakeGateway::new());
        *gateway.fail_updates.lock().unwrap() = true;
        let mut view = view(&gateway);

        assert_err!(view.override_verdict("bob@x.com", Verdict::Shortlist).await);
        assert_eq!(view.candidate("bob@x.com").unwrap().verdict, Verdict::Review);

        *gateway.fail_updates.lock().unwrap() = false;
        assert_ok!(view.override_verdict("bob@x.com", Verdict::Shortlist).await);
        assert_eq!(view.candidate("bob@x.com").unwrap().verdict, Verdict::Shortlist);
        assert_eq!(view.verdict_counts().shortlist, 2);

        // 汇总计数与候选人列表一致
        let result = view.result().unwrap();
        assert_eq!(result.shortlisted, 2);
        assert_eq!(result.under_review, 0);
        assert_eq!(result.rejected, 1);
    }

    #[tokio::test]
    async fn test_export_and_summary() {
        let gateway = Arc::new(FakeGateway::new());
        let view = view(&gateway);

        let csv = view.export_candidates(Some(Verdict::Reject)).await.unwrap();
        let pdf = view.download_summary("ann@x.com").await.unwrap();

        assert!(String::from_utf8(csv).unwrap().contains("reject"));
        assert!(pdf.starts_with(b"%PDF"));
        assert_eq!(gateway.count("export"), 1);
    }

    #[tokio::test]
    async fn test_email_templates() {
        let gateway = Arc::new(FakeGateway::new());
        let view = view(&gateway);

        let ann = view.candidate("ann@x.com").unwrap().clone();
        let bob = view.candidate("bob@x.com").unwrap().clone();
        assert_ok!(view.email_candidate(&ann).await);
        assert_ok!(view.email_candidate(&bob).await);

        let emails = gateway.emails.lock().unwrap();
        assert_eq!(emails[0].subject, "Interview Opportunity - Data Engineer");
        assert!(emails[0].body.contains("shortlisted for the next round"));
        assert_eq!(emails[1].subject, "Interview Opportunity - Position");
        assert!(emails[1].body.starts_with("Dear Bob,"));
        assert!(emails[1].body.contains("We will review your application"));
    }

    #[tokio::test]
    async fn test_email_rejects_malformed_address() {
        let gateway = Arc::new(FakeGateway::new());
        let view = view(&gateway);
        let mut candidate = view.candidate("ann@x.com").unwrap().clone();
        candidate.email = "not-an-email".to_string();

        let err = view.email_candidate(&candidate).await.unwrap_err();

        assert!(err.is_validation());
        assert_eq!(gateway.count("email"), 0);
    }

    #[tokio::test]
    async fn test_bulk_email_single_request() {
        let gateway = Arc::new(FakeGateway::new());
        let view = view(&gateway);
        let emails = vec!["ann@x.com".to_string(), "bob@x.com".to_string()];

        assert_ok!(
            view.bulk_email(&emails, Verdict::Shortlist, "Data Engineer", "Acme")
                .await
        );
        assert_err!(view.bulk_email(&[], Verdict::Reject, "Data Engineer", "Acme").await);

        assert_eq!(gateway.count("bulk_email"), 1);
        let sent = gateway.bulk_emails.lock().unwrap();
        assert_eq!(sent[0].candidate_emails.len(), 2);
        assert_eq!(sent[0].company_name, "Acme");
    }
}
