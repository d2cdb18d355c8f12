//! Deterministic placeholder content for the generation routes.
//!
//! No model is called. Each action returns a JSON patch for its stage
//! payload built from whatever the submitted context already contains, and
//! the assessment is derived from how many required fields are filled.

use forge_core::gate;
use forge_core::quality::{QualityAssessment, QualityThresholds};
use forge_core::stages::StageData;
use forge_core::types::Stage;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Stage payload inside a generation context. The context is either
/// `{stage_key: payload, ...}` or the bare payload itself.
pub fn stage_payload(stage: Stage, context: &Value) -> Value {
    match context.get(stage.as_str()) {
        Some(v) if v.is_object() => v.clone(),
        _ if context.is_object() && !has_stage_keys(context) => context.clone(),
        _ => json!({}),
    }
}

fn has_stage_keys(context: &Value) -> bool {
    Stage::all()
        .iter()
        .any(|s| context.get(s.as_str()).is_some())
}

fn text<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn or<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    value.unwrap_or(fallback)
}

struct IdeaEcho<'a> {
    problem: &'a str,
    audience: &'a str,
    value: &'a str,
}

fn idea_echo<'a>(context: &'a Value, project_name: &'a str) -> IdeaEcho<'a> {
    let idea = context.get(Stage::IdeaRefinement.as_str()).unwrap_or(context);
    IdeaEcho {
        problem: or(text(idea, "problemStatement"), project_name),
        audience: or(text(idea, "targetAudience"), "early adopters"),
        value: or(text(idea, "valueProposition"), "a faster path from idea to product"),
    }
}

/// Patch for `action`, or `None` for an action this server does not know.
pub fn generate(action: &str, project_id: &str, context: &Value) -> Option<Value> {
    let idea = idea_echo(context, project_id);
    let content = match action {
        // Idea refinement ---------------------------------------------------
        "analyze-idea" => json!({
            "problemStatement": idea.problem,
            "targetAudience": idea.audience,
            "valueProposition": idea.value,
            "marketContext": format!("Placeholder market analysis for {project_id}."),
        }),
        "refine-idea" => json!({
            "problemStatement": idea.problem,
            "targetAudience": idea.audience,
            "valueProposition": idea.value,
            "successMetrics": ["weekly active users", "time to first value"],
            "constraints": ["small team", "three month runway"],
        }),

        // PRD ---------------------------------------------------------------
        "extract-requirements" => json!({
            "requirements": [
                {"id": "FR-1", "description": format!("Address: {}", idea.problem),
                 "kind": "functional", "priority": "must"},
                {"id": "FR-2", "description": format!("Onboard {}", idea.audience),
                 "kind": "functional", "priority": "should"},
                {"id": "NFR-1", "description": "p95 page load under 2 seconds",
                 "kind": "non_functional", "priority": "should"},
            ]
        }),
        "generate-user-stories" => json!({
            "userStories": [
                {"id": "US-1", "asA": idea.audience, "iWant": "to capture an idea quickly",
                 "soThat": idea.value, "acceptanceCriteria": ["idea is saved", "idea is listed"],
                 "estimate": 3},
                {"id": "US-2", "asA": idea.audience, "iWant": "to share progress",
                 "soThat": "my team stays aligned", "acceptanceCriteria": ["share link works"],
                 "estimate": 5, "dependsOn": ["US-1"]},
            ]
        }),
        "prioritize-features" => json!({
            "features": [
                {"name": "Idea capture", "priority": "must", "value": 9, "effort": 3},
                {"name": "Team sharing", "priority": "should", "value": 7, "effort": 5},
                {"name": "Analytics", "priority": "could", "value": 5, "effort": 8},
            ]
        }),
        "generate-prd-document" => {
            let sections: Vec<Value> = [
                ("overview", format!("{project_id}: {}", idea.problem)),
                ("requirements", "See extracted requirements.".to_string()),
                ("user_stories", format!("Stories written for {}.", idea.audience)),
                ("feature_prioritization", "MoSCoW ordering applied.".to_string()),
                ("acceptance_criteria", "Every story has at least one criterion.".to_string()),
            ]
            .into_iter()
            .map(|(kind, content)| json!({"kind": kind, "content": content, "completed": true}))
            .collect();
            json!({ "sections": sections })
        }

        // UX ----------------------------------------------------------------
        "generate-user-journeys" => json!({
            "userJourneys": [
                {"persona": idea.audience, "goal": "reach first value",
                 "steps": ["sign up", "describe idea", "review plan"],
                 "painPoints": ["unclear next step"]},
            ]
        }),
        "generate-wireframes" => json!({
            "wireframes": [
                {"screen": "dashboard", "description": "Project overview",
                 "components": ["Header", "ProjectList"]},
                {"screen": "editor", "description": "Stage editor",
                 "components": ["Header", "StageForm"]},
            ]
        }),
        "generate-component-specs" => json!({
            "componentSpecs": [
                {"name": "Header", "purpose": "Navigation", "props": ["user"], "states": ["signed_in"]},
                {"name": "ProjectList", "purpose": "List projects", "props": ["projects"],
                 "states": ["empty", "loaded"]},
                {"name": "StageForm", "purpose": "Edit stage data", "props": ["stage"],
                 "states": ["editing", "saving"]},
            ]
        }),
        "validate-accessibility" => json!({
            "accessibility": [
                {"criterion": "1.1.1", "description": "Non-text content", "level": "A", "satisfied": true},
                {"criterion": "1.4.3", "description": "Contrast (minimum)", "level": "AA", "satisfied": true},
                {"criterion": "2.4.7", "description": "Focus visible", "level": "AA", "satisfied": true},
                {"criterion": "1.4.6", "description": "Contrast (enhanced)", "level": "AAA", "satisfied": false},
            ]
        }),

        // Technical ---------------------------------------------------------
        "analyze-architecture" => json!({
            "architecture": {
                "pattern": "modular monolith",
                "summary": format!("Single deployable for {project_id} with clear module seams."),
                "techStack": ["rust", "postgres", "react"],
            },
            "feasibility": {"technical": 85, "resource": 75, "timeline": 70},
        }),
        "evaluate-architecture-consensus" => {
            let pattern = context
                .get(Stage::TechnicalAnalysis.as_str())
                .and_then(|t| t.get("architecture"))
                .and_then(|a| text(a, "pattern"))
                .unwrap_or("modular monolith");
            json!({
                "modelAnalyses": [
                    {"model": "gpt-4o", "recommendation": pattern, "confidence": 0.8},
                    {"model": "claude", "recommendation": pattern, "confidence": 0.75},
                    {"model": "gemini", "recommendation": "microservices", "confidence": 0.6},
                ],
                "consensus": {
                    "agreementScore": 67,
                    "recommendedApproach": pattern,
                    "dissentingModels": ["gemini"],
                },
            })
        }
        "assess-technical-risks" => json!({
            "risks": [
                {"description": "Generation latency", "likelihood": "medium", "impact": "high",
                 "mitigation": "stream partial results"},
                {"description": "Vendor lock-in", "likelihood": "low", "impact": "medium"},
            ]
        }),

        // Playbook ----------------------------------------------------------
        "generate-coding-prompts" => json!({
            "codingPrompts": [
                {"title": "Scaffold", "prompt": format!("Create the project skeleton for {project_id}.")},
                {"title": "Core flow", "prompt": format!("Implement: {}", idea.problem)},
            ]
        }),
        "create-development-workflow" => json!({
            "developmentWorkflow": {
                "phases": [
                    {"name": "Foundation", "tasks": ["repository", "CI"]},
                    {"name": "Core", "tasks": ["idea capture", "sharing"]},
                ]
            }
        }),
        "generate-testing-strategy" => json!({
            "testingStrategy": {
                "unit": ["domain rules"],
                "integration": ["API routes"],
                "endToEnd": ["sign-up to first idea"],
                "coverageTarget": 80,
            }
        }),
        "create-deployment-guide" => json!({
            "deploymentGuide": {
                "environments": ["staging", "production"],
                "steps": ["provision infrastructure", "run migrations", "deploy", "smoke test"],
            }
        }),
        "validate-context-integration" => {
            let gaps: Vec<&str> = Stage::all()
                .iter()
                .filter(|s| context.get(s.as_str()).is_none())
                .map(|s| s.as_str())
                .collect();
            let present = Stage::all().len() - gaps.len();
            let score = (present * 100 / Stage::all().len()) as u32;
            json!({"contextValidation": {"integrationScore": score, "gaps": gaps}})
        }
        _ => return None,
    };
    Some(content)
}

/// Stage that owns `action`.
pub fn stage_for(action: &str) -> Option<Stage> {
    let stage = match action {
        "analyze-idea" | "refine-idea" => Stage::IdeaRefinement,
        "extract-requirements"
        | "generate-user-stories"
        | "prioritize-features"
        | "generate-prd-document" => Stage::PrdGeneration,
        "generate-user-journeys"
        | "generate-wireframes"
        | "generate-component-specs"
        | "validate-accessibility" => Stage::UxRequirements,
        "analyze-architecture" | "evaluate-architecture-consensus" | "assess-technical-risks" => {
            Stage::TechnicalAnalysis
        }
        "generate-coding-prompts"
        | "create-development-workflow"
        | "generate-testing-strategy"
        | "create-deployment-guide"
        | "compile-playbook"
        | "validate-context-integration" => Stage::ImplementationPlaybook,
        _ => return None,
    };
    Some(stage)
}

/// Shallow-merge `patch` over `base`.
pub fn merged(base: &Value, patch: &Value) -> Value {
    let mut out: Map<String, Value> = base.as_object().cloned().unwrap_or_default();
    if let Some(p) = patch.as_object() {
        for (k, v) in p {
            out.insert(k.clone(), v.clone());
        }
    }
    Value::Object(out)
}

fn populated_keys(payload: &Value) -> usize {
    payload
        .as_object()
        .map(|o| {
            o.values()
                .filter(|v| match v {
                    Value::Null => false,
                    Value::String(s) => !s.trim().is_empty(),
                    Value::Array(a) => !a.is_empty(),
                    Value::Object(m) => !m.is_empty(),
                    _ => true,
                })
                .count()
        })
        .unwrap_or(0)
}

/// Completeness-based placeholder assessment of a stage payload.
pub fn assess(stage: Stage, payload: &Value, thresholds: QualityThresholds) -> QualityAssessment {
    let required = StageData::empty(stage).missing_required().len().max(1);
    let missing = StageData::from_value(stage, payload.clone())
        .map(|d| d.missing_required().len())
        .unwrap_or(required)
        .min(required);

    let completeness = ((required - missing) * 100 / required) as u32;
    let detail = (40 + 10 * populated_keys(payload) as u32).min(100);
    let overall = (completeness * 7 + detail * 3) / 10;

    let mut dimension_scores = BTreeMap::new();
    dimension_scores.insert("completeness".to_string(), completeness);
    dimension_scores.insert("detail".to_string(), detail);

    QualityAssessment {
        overall_score: overall,
        dimension_scores,
        quality_gate_status: gate::classify(overall, &thresholds),
        confidence_level: 0.5,
        thresholds,
    }
}
