use forge_client::{ClientConfig, ClientError, Endpoint, ForgeClient, SequencedClient};
use forge_core::auth::{AuthProvider, AuthUser, GuestAuth, StaticTokenAuth};
use forge_core::quality::GateStatus;
use forge_core::sequence::Sequenced;
use forge_core::types::{ExportFormat, Priority, Stage, UserRole};
use forge_core::ForgeError;
use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn token_auth() -> Arc<dyn AuthProvider> {
    Arc::new(StaticTokenAuth::with_token(
        "tok-123",
        AuthUser {
            id: "u-1".to_string(),
            name: "Ada".to_string(),
            email: None,
            role: UserRole::User,
        },
    ))
}

fn client(url: &str, auth: Arc<dyn AuthProvider>) -> ForgeClient {
    let mut cfg = ClientConfig::new(url);
    cfg.default_model = Some("gpt-4o".to_string());
    ForgeClient::new(cfg, auth).unwrap()
}

fn assessment_json(score: u32, status: &str) -> serde_json::Value {
    json!({
        "overallScore": score,
        "dimensionScores": {"clarity": score},
        "qualityGateStatus": status,
        "confidenceLevel": 0.8,
        "thresholds": {"minimum": 75, "recommended": 85, "adjustmentsApplied": []}
    })
}

#[tokio::test]
async fn generation_sends_bearer_and_parses_envelope() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/forge/analyze-idea")
        .match_header("authorization", "Bearer tok-123")
        .match_body(Matcher::PartialJson(json!({
            "projectId": "hub",
            "stage": "idea_refinement",
            "model": "gpt-4o"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "content": {"problemStatement": "Prompts get lost"},
                "qualityAssessment": assessment_json(82, "CAUTION"),
                "costTracking": {"totalCost": 0.02, "tokensUsed": 1200}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let c = client(&server.url(), token_auth());
    let req = c.request("hub", Stage::IdeaRefinement, json!({}));
    let resp = c.generate(Endpoint::AnalyzeIdea, &req).await.unwrap();

    mock.assert_async().await;
    assert_eq!(resp.content["problemStatement"], "Prompts get lost");
    let qa = resp.quality_assessment.unwrap();
    assert_eq!(qa.overall_score, 82);
    assert_eq!(qa.quality_gate_status, GateStatus::Caution);
    assert_eq!(resp.cost_tracking.unwrap().tokens_used, 1200);
}

#[tokio::test]
async fn guest_requests_carry_no_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/forge/refine-idea")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body(r#"{"content": {}}"#)
        .create_async()
        .await;

    let c = client(&server.url(), Arc::new(GuestAuth::new(5)));
    let req = c.request("hub", Stage::IdeaRefinement, json!({}));
    c.generate(Endpoint::RefineIdea, &req).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn error_message_is_surfaced() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/forge/generate-user-stories")
        .with_status(422)
        .with_body(r#"{"error": "context is missing the PRD overview"}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/api/forge/prioritize-features")
        .with_status(500)
        .with_body(r#"{"message": "model quota exceeded"}"#)
        .create_async()
        .await;

    let c = client(&server.url(), token_auth());
    let req = c.request("hub", Stage::PrdGeneration, json!({}));

    match c.generate_user_stories(&req).await.unwrap_err() {
        ClientError::Api { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "context is missing the PRD overview");
        }
        other => panic!("unexpected error: {other}"),
    }
    let err = c
        .generate(Endpoint::PrioritizeFeatures, &req)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(err.to_string().contains("model quota exceeded"));
}

#[tokio::test]
async fn unauthorized_maps_to_variant() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/forge/assess-quality")
        .with_status(401)
        .with_body(r#"{"error": "token expired"}"#)
        .create_async()
        .await;

    let c = client(&server.url(), token_auth());
    let err = c
        .assess_quality("hub", Stage::IdeaRefinement, json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized(ref m) if m == "token expired"));
}

#[tokio::test]
async fn assess_quality_returns_assessment() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/forge/assess-quality")
        .with_status(200)
        .with_body(json!({"content": assessment_json(91, "EXCELLENT")}).to_string())
        .create_async()
        .await;

    let c = client(&server.url(), token_auth());
    let qa = c
        .assess_quality("hub", Stage::TechnicalAnalysis, json!({"architecture": {}}))
        .await
        .unwrap();
    assert_eq!(qa.quality_gate_status, GateStatus::Excellent);
}

#[tokio::test]
async fn export_uses_content_disposition() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/forge/export-playbook/hub")
        .match_query(Matcher::UrlEncoded("format".into(), "markdown".into()))
        .with_status(200)
        .with_header("content-type", "text/markdown")
        .with_header("content-disposition", r#"attachment; filename="hub.md""#)
        .with_body("# Hub Playbook\n")
        .create_async()
        .await;

    let c = client(&server.url(), token_auth());
    let doc = c
        .export_playbook("hub", ExportFormat::Markdown)
        .await
        .unwrap();
    mock.assert_async().await;
    assert_eq!(doc.filename, "hub.md");
    assert_eq!(doc.content_type, "text/markdown");
    assert_eq!(doc.bytes, b"# Hub Playbook\n");

    let dir = tempfile::TempDir::new().unwrap();
    let path = doc.save_in(dir.path()).unwrap();
    assert!(path.ends_with("hub.md"));
}

#[tokio::test]
async fn export_falls_back_to_default_name() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/forge/export-playbook/hub")
        .match_query(Matcher::UrlEncoded("format".into(), "json".into()))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;
    server
        .mock("GET", "/api/forge/export-playbook/hub")
        .match_query(Matcher::UrlEncoded("format".into(), "pdf".into()))
        .with_status(501)
        .with_body(r#"{"error": "pdf export is not available"}"#)
        .create_async()
        .await;

    let c = client(&server.url(), token_auth());
    let doc = c.export_playbook("hub", ExportFormat::Json).await.unwrap();
    assert_eq!(doc.filename, "hub-playbook.json");
    let err = c
        .export_playbook("hub", ExportFormat::Pdf)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(501));
}

#[tokio::test]
async fn export_endpoint_rejects_post_call() {
    let c = client("http://127.0.0.1:9", token_auth());
    let req = c.request("hub", Stage::ImplementationPlaybook, json!({}));
    let err = c.generate(Endpoint::ExportPlaybook, &req).await.unwrap_err();
    assert!(matches!(err, ClientError::WrongMethod(_)));
}

#[tokio::test]
async fn superseded_response_is_stale() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/forge/generate-wireframes")
        .match_body(Matcher::PartialJson(json!({"context": {"attempt": 1}})))
        .with_status(200)
        .with_chunked_body(|w| {
            std::thread::sleep(Duration::from_millis(400));
            w.write_all(br#"{"content": {"wireframes": []}}"#)
        })
        .create_async()
        .await;
    server
        .mock("POST", "/api/forge/generate-wireframes")
        .match_body(Matcher::PartialJson(json!({"context": {"attempt": 2}})))
        .with_status(200)
        .with_body(r#"{"content": {"wireframes": [{"screen": "library"}]}}"#)
        .create_async()
        .await;

    let seq = SequencedClient::new(client(&server.url(), token_auth()));
    let first_req = seq
        .inner()
        .request("hub", Stage::UxRequirements, json!({"attempt": 1}));
    let second_req = seq
        .inner()
        .request("hub", Stage::UxRequirements, json!({"attempt": 2}));

    let first = {
        let seq = seq.clone();
        tokio::spawn(async move {
            seq.call::<serde_json::Value>(Endpoint::GenerateWireframes, &first_req)
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    let second = seq
        .call::<serde_json::Value>(Endpoint::GenerateWireframes, &second_req)
        .await
        .unwrap();

    let fresh = second.into_fresh().unwrap();
    assert_eq!(fresh.content["wireframes"][0]["screen"], "library");
    assert_eq!(first.await.unwrap().unwrap(), Sequenced::Stale);
}

#[tokio::test]
async fn exclusive_call_rejects_duplicate() {
    let c = client("http://127.0.0.1:9", token_auth());
    let seq = SequencedClient::new(c);
    let _pending = seq.sequencer().try_begin("hub:analyze-idea").unwrap();
    let req = seq.inner().request("hub", Stage::IdeaRefinement, json!({}));
    let err = seq
        .call_exclusive::<serde_json::Value>(Endpoint::AnalyzeIdea, &req)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InFlight(_)));
}

#[tokio::test]
async fn guest_allowance_is_charged_per_generation() {
    let mut server = mockito::Server::new_async().await;
    let generation = server
        .mock("POST", "/api/forge/analyze-idea")
        .with_status(200)
        .with_body(r#"{"content": {}}"#)
        .expect(1)
        .create_async()
        .await;
    server
        .mock("POST", "/api/forge/assess-quality")
        .with_status(200)
        .with_body(json!({"content": assessment_json(80, "CAUTION")}).to_string())
        .expect(2)
        .create_async()
        .await;

    let c = client(&server.url(), Arc::new(GuestAuth::new(1)));
    let req = c.request("hub", Stage::IdeaRefinement, json!({}));
    c.generate(Endpoint::AnalyzeIdea, &req).await.unwrap();
    let err = c.generate(Endpoint::AnalyzeIdea, &req).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Core(ForgeError::GuestLimitReached { limit: 1 })
    ));
    generation.assert_async().await;

    // Assessment is not a generation and stays available.
    for _ in 0..2 {
        c.assess_quality("hub", Stage::IdeaRefinement, json!({}))
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn priority_is_sent_with_assessment() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/forge/assess-quality")
        .match_body(Matcher::PartialJson(json!({"priority": "critical"})))
        .with_status(200)
        .with_body(json!({"content": assessment_json(90, "EXCELLENT")}).to_string())
        .create_async()
        .await;

    let c = client(&server.url(), token_auth());
    let req = c
        .request("hub", Stage::PrdGeneration, json!({}))
        .with_priority(Priority::Critical);
    c.assess(&req).await.unwrap();
    mock.assert_async().await;

    let plain = serde_json::to_value(c.request("hub", Stage::PrdGeneration, json!({}))).unwrap();
    assert!(plain.get("priority").is_none());
}

#[tokio::test]
async fn superseded_failure_is_stale() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/forge/analyze-architecture")
        .match_body(Matcher::PartialJson(json!({"context": {"attempt": 1}})))
        .with_status(500)
        .with_chunked_body(|w| {
            std::thread::sleep(Duration::from_millis(400));
            w.write_all(br#"{"error": "model timed out"}"#)
        })
        .create_async()
        .await;
    server
        .mock("POST", "/api/forge/analyze-architecture")
        .match_body(Matcher::PartialJson(json!({"context": {"attempt": 2}})))
        .with_status(200)
        .with_body(r#"{"content": {"architecture": {}}}"#)
        .create_async()
        .await;

    let seq = SequencedClient::new(client(&server.url(), token_auth()));
    let first_req = seq
        .inner()
        .request("hub", Stage::TechnicalAnalysis, json!({"attempt": 1}));
    let second_req = seq
        .inner()
        .request("hub", Stage::TechnicalAnalysis, json!({"attempt": 2}));

    let first = {
        let seq = seq.clone();
        tokio::spawn(async move {
            seq.call::<serde_json::Value>(Endpoint::AnalyzeArchitecture, &first_req)
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    let second = seq
        .call::<serde_json::Value>(Endpoint::AnalyzeArchitecture, &second_req)
        .await
        .unwrap();

    assert!(second.is_fresh());
    assert_eq!(first.await.unwrap().unwrap(), Sequenced::Stale);
}
