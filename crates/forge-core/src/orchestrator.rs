//! Stage orchestrator: owns the current stage of a project and gates every
//! forward transition on payload completeness and the quality gate.
//!
//! The orchestrator holds no I/O. Callers load and store the snapshot
//! (`project` + `context`) wherever they keep it.

use crate::config::{ForgeConfig, QualityConfig, WorkflowConfig};
use crate::error::{ForgeError, Result};
use crate::gate::{self, GateDecision, QualityGate};
use crate::project::{ForgeProject, StageOutcome};
use crate::quality::QualityThresholds;
use crate::stages::StageData;
use crate::types::{ProjectStatus, Stage, UserRole};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// StageContext
// ---------------------------------------------------------------------------

/// Outputs of completed stages plus in-progress drafts, keyed by stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageContext {
    #[serde(default)]
    pub outputs: BTreeMap<Stage, StageData>,
    #[serde(default)]
    pub drafts: BTreeMap<Stage, StageData>,
}

impl StageContext {
    pub fn output(&self, stage: Stage) -> Option<&StageData> {
        self.outputs.get(&stage)
    }

    pub fn draft(&self, stage: Stage) -> Option<&StageData> {
        self.drafts.get(&stage)
    }

    /// Completed output if present, otherwise the draft.
    pub fn get(&self, stage: Stage) -> Option<&StageData> {
        self.output(stage).or_else(|| self.draft(stage))
    }

    /// JSON object `{stage: payload}` sent as generation context.
    pub fn to_request_context(&self) -> Result<serde_json::Value> {
        let mut map = serde_json::Map::new();
        for &stage in Stage::all() {
            if let Some(data) = self.get(stage) {
                map.insert(stage.as_str().to_string(), data.to_value()?);
            }
        }
        Ok(serde_json::Value::Object(map))
    }

    fn truncate_from(&mut self, stage: Stage) {
        self.outputs.retain(|s, _| *s < stage);
        self.drafts.retain(|s, _| *s < stage);
    }
}

// ---------------------------------------------------------------------------
// Config / inputs / outputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    pub quality: QualityConfig,
    pub workflow: WorkflowConfig,
}

impl From<&ForgeConfig> for OrchestratorConfig {
    fn from(cfg: &ForgeConfig) -> Self {
        Self {
            quality: cfg.quality.clone(),
            workflow: cfg.workflow.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StageCompletion {
    pub stage: Stage,
    pub output: StageData,
    pub score: u32,
    pub role: UserRole,
    pub override_requested: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageAdvance {
    pub from: Stage,
    pub to: Option<Stage>,
    pub decision: GateDecision,
    pub thresholds: QualityThresholds,
    pub progress_percentage: u32,
    pub workflow_complete: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageView<'a> {
    pub stage: Stage,
    pub label: &'static str,
    pub is_current: bool,
    pub is_finished: bool,
    pub is_accessible: bool,
    pub data: Option<&'a StageData>,
    pub missing: Vec<&'static str>,
    pub thresholds: QualityThresholds,
}

// ---------------------------------------------------------------------------
// StageOrchestrator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct StageOrchestrator {
    project: ForgeProject,
    context: StageContext,
    config: OrchestratorConfig,
}

impl StageOrchestrator {
    pub fn new(project: ForgeProject, config: OrchestratorConfig) -> Self {
        Self::from_parts(project, StageContext::default(), config)
    }

    pub fn from_parts(
        project: ForgeProject,
        context: StageContext,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            project,
            context,
            config,
        }
    }

    pub fn into_parts(self) -> (ForgeProject, StageContext) {
        (self.project, self.context)
    }

    pub fn project(&self) -> &ForgeProject {
        &self.project
    }

    pub fn project_mut(&mut self) -> &mut ForgeProject {
        &mut self.project
    }

    pub fn context(&self) -> &StageContext {
        &self.context
    }

    pub fn current_stage(&self) -> Stage {
        self.project.current_stage
    }

    pub fn thresholds(&self, stage: Stage) -> QualityThresholds {
        gate::thresholds_for(stage, &self.config.quality, self.project.priority)
    }

    /// Run the quality gate for `stage` without changing any state.
    pub fn evaluate_gate(
        &self,
        stage: Stage,
        score: u32,
        role: UserRole,
        override_requested: bool,
    ) -> (QualityThresholds, GateDecision) {
        let thresholds = self.thresholds(stage);
        let decision = QualityGate::new(&thresholds).evaluate(score, role, override_requested);
        (thresholds, decision)
    }

    pub fn view(&self, stage: Stage) -> StageView<'_> {
        let current = self.current_stage();
        let finished = self.project.finished_stages().contains(&stage);
        let data = self.context.get(stage);
        StageView {
            stage,
            label: stage.label(),
            is_current: stage == current && !self.project.is_finished(),
            is_finished: finished,
            is_accessible: stage <= current,
            data,
            missing: data
                .map(|d| d.missing_required())
                .unwrap_or_else(|| StageData::empty(stage).missing_required()),
            thresholds: self.thresholds(stage),
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.project.is_finished() {
            return Err(ForgeError::WorkflowComplete(self.project.id.clone()));
        }
        if !self.project.status.is_open() {
            return Err(ForgeError::ProjectClosed {
                id: self.project.id.clone(),
                status: self.project.status.to_string(),
            });
        }
        Ok(())
    }

    fn ensure_current(&self, stage: Stage) -> Result<()> {
        let current = self.current_stage();
        if stage != current {
            return Err(ForgeError::StageMismatch {
                current: current.to_string(),
                submitted: stage.to_string(),
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Drafts
    // -----------------------------------------------------------------------

    /// Merge a JSON patch into the current stage's draft.
    pub fn update_draft(&mut self, stage: Stage, patch: serde_json::Value) -> Result<&StageData> {
        self.ensure_open()?;
        self.ensure_current(stage)?;
        let draft = self
            .context
            .drafts
            .entry(stage)
            .or_insert_with(|| StageData::empty(stage));
        draft.merge(patch)?;
        self.project.touch();
        Ok(draft)
    }

    pub fn set_draft(&mut self, data: StageData) -> Result<()> {
        self.ensure_open()?;
        self.ensure_current(data.stage())?;
        self.context.drafts.insert(data.stage(), data);
        self.project.touch();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    pub fn complete_stage(&mut self, completion: StageCompletion) -> Result<StageAdvance> {
        self.ensure_open()?;
        let stage = completion.stage;
        self.ensure_current(stage)?;

        if completion.output.stage() != stage {
            return Err(ForgeError::InvalidPayload {
                stage: stage.to_string(),
                reason: format!("payload belongs to '{}'", completion.output.stage()),
            });
        }

        let missing = completion.output.missing_required();
        if !missing.is_empty() {
            return Err(ForgeError::IncompleteStage {
                stage: stage.to_string(),
                missing: missing.into_iter().map(str::to_string).collect(),
            });
        }

        let (thresholds, decision) = self.evaluate_gate(
            stage,
            completion.score,
            completion.role,
            completion.override_requested,
        );
        let outcome = match &decision {
            GateDecision::Block { score, minimum, .. } => {
                return Err(ForgeError::GateBlocked {
                    stage: stage.to_string(),
                    score: *score,
                    minimum: *minimum,
                });
            }
            GateDecision::Overridden { .. } => StageOutcome::Overridden,
            GateDecision::Pass { .. } => StageOutcome::Completed,
        };

        self.context.drafts.remove(&stage);
        self.context.outputs.insert(stage, completion.output);
        let to = self.advance(stage, outcome, Some(completion.score));

        tracing::info!(
            project = %self.project.id,
            from = %stage,
            to = to.map(|s| s.as_str()).unwrap_or("done"),
            score = completion.score,
            outcome = %decision.outcome_label(),
            "stage completed"
        );

        Ok(StageAdvance {
            from: stage,
            to,
            decision,
            thresholds,
            progress_percentage: self.project.progress_percentage,
            workflow_complete: self.project.is_finished(),
        })
    }

    fn advance(&mut self, stage: Stage, outcome: StageOutcome, score: Option<u32>) -> Option<Stage> {
        if self.project.status == ProjectStatus::Draft {
            self.project.status = ProjectStatus::Active;
        }
        let next = stage.next();
        self.project.record_transition(outcome, score, next);
        if next.is_none() {
            self.project.status = ProjectStatus::Completed;
        }
        self.project.recompute_progress();
        next
    }

    pub fn skip_stage(&mut self, stage: Stage) -> Result<Stage> {
        self.ensure_open()?;
        self.ensure_current(stage)?;
        let refuse = |reason: &str| ForgeError::InvalidTransition {
            from: stage.to_string(),
            to: stage.next().map(|s| s.to_string()).unwrap_or_default(),
            reason: reason.to_string(),
        };
        if !stage.is_skippable() {
            return Err(refuse("stage cannot be skipped"));
        }
        if !self.config.workflow.allow_ux_skip {
            return Err(refuse("skipping is disabled in workflow config"));
        }

        self.context.drafts.remove(&stage);
        self.context.outputs.remove(&stage);
        let to = self
            .advance(stage, StageOutcome::Skipped, None)
            .ok_or_else(|| refuse("no stage follows"))?;
        tracing::info!(project = %self.project.id, skipped = %stage, to = %to, "stage skipped");
        Ok(to)
    }

    pub fn rollback_to(&mut self, target: Stage, role: UserRole) -> Result<Stage> {
        let current = self.current_stage();
        if !self.config.workflow.allow_rollback {
            return Err(ForgeError::InvalidTransition {
                from: current.to_string(),
                to: target.to_string(),
                reason: "rollback is disabled in workflow config".to_string(),
            });
        }
        if !role.can_rollback() {
            return Err(ForgeError::PermissionDenied(format!(
                "role '{role}' cannot roll back stages"
            )));
        }
        if target >= current {
            return Err(ForgeError::InvalidTransition {
                from: current.to_string(),
                to: target.to_string(),
                reason: "rollback target must be an earlier stage".to_string(),
            });
        }

        self.context.truncate_from(target);
        self.project
            .record_transition(StageOutcome::RolledBack, None, Some(target));
        if self.project.status == ProjectStatus::Completed {
            self.project.status = ProjectStatus::Active;
        }
        self.project.recompute_progress();
        tracing::info!(project = %self.project.id, from = %current, to = %target, "stage rolled back");
        Ok(target)
    }

    // -----------------------------------------------------------------------
    // Export
    // -----------------------------------------------------------------------

    pub fn export_enabled(&self) -> bool {
        match self.context.get(Stage::ImplementationPlaybook) {
            Some(StageData::ImplementationPlaybook(p)) => p.export_enabled(),
            _ => false,
        }
    }

    pub fn can_export(&self, stage: Stage) -> bool {
        stage == Stage::ImplementationPlaybook && self.export_enabled()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
