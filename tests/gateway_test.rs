//! 远程网关集成测试
//!
//! 使用 wiremock 模拟后端，验证请求路径、请求体和错误透传

use resume_screener::clients::{CandidateUpdate, ScreenerClient, ScreenerGateway};
use resume_screener::error::{AppError, RemoteError};
use resume_screener::models::{
    AnalyzeRequest, JobConfiguration, ResumeFile, StorageScope, Verdict,
};
use resume_screener::Config;
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> ScreenerClient {
    let config = Config {
        api_base_url: server.uri(),
        ..Config::default()
    };
    ScreenerClient::new(&config).expect("创建客户端失败")
}

fn job() -> JobConfiguration {
    JobConfiguration::new(
        "Backend engineer with Rust and distributed systems experience for a payments platform.",
    )
}

#[tokio::test]
async fn test_upload_sends_multipart_to_scope_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/screener/upload"))
        .and(body_string_contains("filename=\"ann.pdf\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "File uploaded successfully",
            "data": {"filename": "ann.pdf", "size": 4}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/screener/upload-to-blob"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "File uploaded to Azure Blob successfully"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let file = ResumeFile::new("ann.pdf", b"%PDF".to_vec());

    let ack = client
        .upload_resume(StorageScope::Temporary, &file)
        .await
        .unwrap();
    assert_eq!(ack.filename, "ann.pdf");
    assert_eq!(ack.size, 4);

    // 没有 data 时使用本地文件信息
    let ack = client.upload_resume(StorageScope::Durable, &file).await.unwrap();
    assert_eq!(ack.filename, "ann.pdf");
}

#[tokio::test]
async fn test_unsupported_file_never_reaches_server() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server)
        .upload_resume(
            StorageScope::Temporary,
            &ResumeFile::new("notes.txt", b"hello".to_vec()),
        )
        .await
        .unwrap_err();

    assert!(err.is_validation());
}

#[tokio::test]
async fn test_analyze_error_detail_is_verbatim() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/screener/analyze"))
        .and(body_partial_json(json!({
            "load_from_blob": false,
            "job_config": {"shortlist_threshold": 75, "reject_threshold": 40}
        })))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": "No resumes uploaded. Please upload resumes first."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = job();
    config.load_from_blob = false;

    let err = client(&server)
        .analyze(&AnalyzeRequest::from(&config))
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "No resumes uploaded. Please upload resumes first."
    );
    match err {
        AppError::Remote(RemoteError::Status { status, .. }) => assert_eq!(status, 400),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_analyze_parses_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/screener/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_processed": 1,
            "shortlisted": 1,
            "under_review": 0,
            "rejected": 0,
            "processing_time": 3.4,
            "metrics": {"avg_time_per_resume": 3.4, "session_id": "abc"},
            "candidates": [{
                "name": "Ann Lee",
                "email": "ann@x.com",
                "phone": null,
                "jd_role": "Backend Engineer",
                "jd_similarity": 81.0,
                "skills_match": 77.5,
                "domain_match": 70.0,
                "experience_match": 90.0,
                "score": 80.2,
                "verdict": "shortlist",
                "fitment": "Strong fit",
                "highlights": ["Rust", "Kafka"],
                "red_flags": [],
                "fraud_detected": false
            }]
        })))
        .mount(&server)
        .await;

    let result = client(&server)
        .analyze(&AnalyzeRequest::from(&job()))
        .await
        .unwrap()
        .into_result();

    assert_eq!(result.shortlisted, 1);
    let ann = &result.candidates[0];
    assert_eq!(ann.verdict, Verdict::Shortlist);
    assert_eq!(ann.phone, "");
    assert_eq!(ann.highlights, vec!["Rust", "Kafka"]);
}

#[tokio::test]
async fn test_error_body_with_error_key() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/api/screener/candidate/update"))
        .and(body_partial_json(json!({
            "candidate_id": "ghost@x.com",
            "recruiter_notes": "hello"
        })))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "Candidate not found",
            "status_code": 404
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .update_candidate(&CandidateUpdate::notes("ghost@x.com", "hello"))
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Candidate not found");
}

#[tokio::test]
async fn test_success_false_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/gmail/sync"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "Gmail credentials missing"
        })))
        .mount(&server)
        .await;

    let err = client(&server).trigger_sync().await.unwrap_err();

    assert!(matches!(
        err,
        AppError::Remote(RemoteError::Rejected { .. })
    ));
    assert_eq!(err.to_string(), "Gmail credentials missing");
}

#[tokio::test]
async fn test_export_csv_with_verdict_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/screener/export/csv"))
        .and(query_param("verdict", "shortlist"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"name,email\nAnn,ann@x.com\n".to_vec(), "text/csv"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let csv = client(&server)
        .export_csv(Some(Verdict::Shortlist))
        .await
        .unwrap();

    assert!(String::from_utf8(csv).unwrap().contains("ann@x.com"));
}

#[tokio::test]
async fn test_delete_escapes_file_name_and_lists_durable() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/screener/delete-blob/my%20cv.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "File deleted"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/screener/list-blob-files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Found 2 files",
            "data": {"files": ["a.pdf", "b.docx"], "count": 2}
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    client
        .delete_resume(StorageScope::Durable, "my cv.pdf")
        .await
        .unwrap();
    let files = client.list_durable_files().await.unwrap();

    assert_eq!(files, vec!["a.pdf", "b.docx"]);
}

#[tokio::test]
async fn test_sync_status_and_dashboard_shapes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/gmail/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "is_active": false,
            "last_sync": null,
            "emails_processed": 0,
            "files_uploaded": 0,
            "errors": []
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/dashboard/analytics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Analytics retrieved",
            "data": {
                "score_distribution": [{"range": "81-100", "count": 2}],
                "verdict_breakdown": {"shortlist": 2},
                "skill_trends": [],
                "processing_metrics": {"total_processed": 2, "avg_processing_time": 1.5, "success_rate": 100.0},
                "timestamp": "2025-01-01T00:00:00"
            }
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    let status = client.sync_status().await.unwrap();
    let analytics = client.dashboard_analytics().await.unwrap();

    assert!(status.never_synced());
    assert_eq!(status.last_sync_label(), "Never");
    assert_eq!(analytics.score_distribution.len(), 1);
    assert_eq!(analytics.verdict_breakdown, vec![("shortlist".to_string(), 2.0)]);
    assert!(analytics.skill_trends.is_empty());
}

#[tokio::test]
async fn test_transport_error_when_backend_down() {
    // 取一个空闲端口后立即释放，保证没有服务监听
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .and_then(|l| l.local_addr())
        .unwrap()
        .port();
    let config = Config {
        api_base_url: format!("http://127.0.0.1:{}", port),
        ..Config::default()
    };
    let client = ScreenerClient::new(&config).unwrap();

    let err = client.health().await.unwrap_err();

    assert!(matches!(
        err,
        AppError::Remote(RemoteError::Transport { .. })
    ));
}
