use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use forge_core::gate;
use forge_core::stages::StageData;
use forge_core::types::{Priority, Stage};
use forge_core::ForgeError;
use serde::Deserialize;

use crate::error::AppError;
use crate::routes::authorize;
use crate::state::AppState;
use crate::stub;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgeRequest {
    pub project_id: String,
    pub stage: Stage,
    #[serde(default)]
    pub context: serde_json::Value,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
}

fn envelope(
    content: serde_json::Value,
    assessment: serde_json::Value,
    model: Option<&str>,
) -> serde_json::Value {
    let tokens = (content.to_string().len() / 4) as u64;
    serde_json::json!({
        "content": content,
        "qualityAssessment": assessment,
        "costTracking": {
            "totalCost": 0.0,
            "tokensUsed": tokens,
            "model": model.unwrap_or("stub"),
        },
    })
}

/// POST /api/forge/{action}: every generation step plus `assess-quality`.
pub async fn forge_action(
    State(app): State<AppState>,
    Path(action): Path<String>,
    headers: HeaderMap,
    Json(req): Json<ForgeRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    authorize(&app, &headers)?;
    forge_core::paths::validate_project_id(&req.project_id)?;
    let priority = req.priority.unwrap_or_default();
    let thresholds = gate::thresholds_for(req.stage, &app.quality, priority);
    tracing::debug!(%action, project = %req.project_id, stage = %req.stage, "forge action");

    if action == "assess-quality" {
        let payload = stub::stage_payload(req.stage, &req.context);
        let qa = stub::assess(req.stage, &payload, thresholds);
        return Ok(Json(serde_json::json!({ "content": qa })));
    }

    let Some(owner) = stub::stage_for(&action) else {
        return Err(AppError::not_found(format!("unknown forge action '{action}'")));
    };
    if owner != req.stage {
        return Err(ForgeError::StageMismatch {
            current: req.stage.to_string(),
            submitted: owner.to_string(),
        }
        .into());
    }

    let content = if action == "compile-playbook" {
        compile(&app, &req).await?
    } else {
        stub::generate(&action, &req.project_id, &req.context)
            .ok_or_else(|| AppError::not_found(format!("unknown forge action '{action}'")))?
    };

    let payload = stub::merged(&stub::stage_payload(req.stage, &req.context), &content);
    let qa = stub::assess(req.stage, &payload, thresholds);
    Ok(Json(envelope(
        content,
        serde_json::to_value(qa)?,
        req.model.as_deref(),
    )))
}

async fn compile(app: &AppState, req: &ForgeRequest) -> Result<serde_json::Value, AppError> {
    let payload = stub::stage_payload(Stage::ImplementationPlaybook, &req.context);
    let data = StageData::from_value(Stage::ImplementationPlaybook, payload)?;
    let StageData::ImplementationPlaybook(playbook) = data else {
        return Err(AppError(anyhow::anyhow!("playbook payload did not parse as a playbook")));
    };

    let title = format!("{} Implementation Playbook", req.project_id);
    let Some(compiled) = playbook.compile(title, Utc::now()) else {
        let missing: Vec<String> = [
            ("codingPrompts", playbook.coding_prompts.is_empty()),
            ("developmentWorkflow", playbook.development_workflow.is_none()),
            ("testingStrategy", playbook.testing_strategy.is_none()),
            ("deploymentGuide", playbook.deployment_guide.is_none()),
        ]
        .into_iter()
        .filter(|(_, absent)| *absent)
        .map(|(name, _)| name.to_string())
        .collect();
        return Err(ForgeError::IncompleteStage {
            stage: Stage::ImplementationPlaybook.to_string(),
            missing,
        }
        .into());
    };

    app.playbooks
        .write()
        .await
        .insert(req.project_id.clone(), compiled.clone());
    tracing::info!(project = %req.project_id, sections = compiled.sections.len(), "playbook compiled");
    Ok(serde_json::json!({ "compiled": compiled }))
}
