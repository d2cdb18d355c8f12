use axum::http::StatusCode;
use forge_core::config::QualityConfig;
use forge_server::{build_router, stub, AppState};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn app() -> axum::Router {
    build_router(AppState::new(QualityConfig::default()))
}

async fn send(
    app: axum::Router,
    req: axum::http::Request<axum::body::Body>,
) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, body.to_vec())
}

/// Send a GET request via `oneshot` and return (status, parsed JSON body).
async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (status, _, body) = send(app, req).await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Send a POST request with a JSON body via `oneshot` and return (status, parsed JSON body).
async fn post_json(
    app: axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    post_json_with_token(app, uri, None, body).await
}

async fn post_json_with_token(
    app: axum::Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let mut builder = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(t) = token {
        builder = builder.header("authorization", format!("Bearer {t}"));
    }
    let req = builder
        .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    let (status, _, body) = send(app, req).await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// A playbook payload with all four content sections present.
fn compilable_playbook() -> serde_json::Value {
    let mut payload = json!({});
    for action in [
        "generate-coding-prompts",
        "create-development-workflow",
        "generate-testing-strategy",
        "create-deployment-guide",
    ] {
        let patch = stub::generate(action, "hub", &json!({})).unwrap();
        payload = stub::merged(&payload, &patch);
    }
    payload
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_ok() {
    let (status, body) = get(app(), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn analyze_idea_returns_envelope() {
    let (status, body) = post_json(
        app(),
        "/api/forge/analyze-idea",
        json!({
            "projectId": "hub",
            "stage": "idea_refinement",
            "context": {"idea_refinement": {"problemStatement": "Prompts get lost"}},
            "model": "gpt-4o"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["content"].is_object());
    assert!(body["qualityAssessment"]["overallScore"].is_u64());
    assert_eq!(body["costTracking"]["model"], "gpt-4o");
    assert_eq!(body["costTracking"]["totalCost"], 0.0);
}

#[tokio::test]
async fn unknown_action_is_404() {
    let (status, body) = post_json(
        app(),
        "/api/forge/summon-unicorn",
        json!({"projectId": "hub", "stage": "idea_refinement"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("summon-unicorn"));
}

#[tokio::test]
async fn action_for_other_stage_is_rejected() {
    let (status, _) = post_json(
        app(),
        "/api/forge/generate-wireframes",
        json!({"projectId": "hub", "stage": "idea_refinement"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn invalid_project_id_is_400() {
    let (status, _) = post_json(
        app(),
        "/api/forge/analyze-idea",
        json!({"projectId": "Not Valid", "stage": "idea_refinement"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn assess_quality_scores_completeness() {
    let (status, empty) = post_json(
        app(),
        "/api/forge/assess-quality",
        json!({"projectId": "hub", "stage": "idea_refinement", "context": {}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(empty["content"]["qualityGateStatus"], "BLOCKED");

    let (_, full) = post_json(
        app(),
        "/api/forge/assess-quality",
        json!({
            "projectId": "hub",
            "stage": "idea_refinement",
            "context": {
                "problemStatement": "Prompts scatter across docs",
                "targetAudience": "Prompt engineers",
                "valueProposition": "One searchable library",
                "marketContext": "Teams adopting LLM tooling",
                "successMetrics": ["Weekly active users"]
            }
        }),
    )
    .await;
    let score = full["content"]["overallScore"].as_u64().unwrap();
    let empty_score = empty["content"]["overallScore"].as_u64().unwrap();
    assert!(score > empty_score);
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[tokio::test]
async fn assessment_thresholds_follow_request_priority() {
    let body = |priority: Option<&str>| {
        let mut req = json!({"projectId": "hub", "stage": "prd_generation", "context": {}});
        if let Some(p) = priority {
            req["priority"] = json!(p);
        }
        req
    };
    let (_, medium) = post_json(app(), "/api/forge/assess-quality", body(None)).await;
    let (status, critical) =
        post_json(app(), "/api/forge/assess-quality", body(Some("critical"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(medium["content"]["thresholds"]["minimum"], 80);
    assert_eq!(critical["content"]["thresholds"]["minimum"], 85);
}

#[tokio::test]
async fn token_is_enforced_when_configured() {
    let app = build_router(AppState::new(QualityConfig::default()).with_token("s3cret"));
    let req = json!({"projectId": "hub", "stage": "idea_refinement"});

    let (status, _) =
        post_json_with_token(app.clone(), "/api/forge/analyze-idea", None, req.clone()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) =
        post_json_with_token(app.clone(), "/api/forge/analyze-idea", Some("nope"), req.clone())
            .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) =
        post_json_with_token(app, "/api/forge/analyze-idea", Some("s3cret"), req).await;
    assert_eq!(status, StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Compile and export
// ---------------------------------------------------------------------------

#[tokio::test]
async fn compile_requires_all_sections() {
    let (status, body) = post_json(
        app(),
        "/api/forge/compile-playbook",
        json!({
            "projectId": "hub",
            "stage": "implementation_playbook",
            "context": {"implementation_playbook": {}}
        }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("codingPrompts"));
}

#[tokio::test]
async fn export_before_compile_is_404() {
    let (status, _) = get(app(), "/api/forge/export-playbook/hub?format=json").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn compile_then_export_markdown_and_json() {
    let app = app();
    let (status, body) = post_json(
        app.clone(),
        "/api/forge/compile-playbook",
        json!({
            "projectId": "hub",
            "stage": "implementation_playbook",
            "context": {"implementation_playbook": compilable_playbook()}
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"]["compiled"]["title"], "hub Implementation Playbook");

    let req = axum::http::Request::builder()
        .uri("/api/forge/export-playbook/hub?format=markdown")
        .body(axum::body::Body::empty())
        .unwrap();
    let (status, headers, bytes) = send(app.clone(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers["content-disposition"],
        r#"attachment; filename="hub-playbook.md""#
    );
    assert!(headers["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/markdown"));
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.starts_with("# hub Implementation Playbook"));
    assert!(text.contains("Coding Prompts"));

    let (status, json) = get(app, "/api/forge/export-playbook/hub").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["sections"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn binary_formats_are_not_implemented() {
    let app = app();
    post_json(
        app.clone(),
        "/api/forge/compile-playbook",
        json!({
            "projectId": "hub",
            "stage": "implementation_playbook",
            "context": compilable_playbook()
        }),
    )
    .await;
    let (status, _) = get(app.clone(), "/api/forge/export-playbook/hub?format=pdf").await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    let (status, _) = get(app, "/api/forge/export-playbook/hub?format=docx").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
