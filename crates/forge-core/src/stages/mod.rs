//! Per-stage payloads produced by user input and generation responses.
//!
//! Each payload reports the fields it still needs via `missing_required`;
//! the orchestrator refuses to complete a stage while that list is non-empty.

pub mod idea;
pub mod playbook;
pub mod prd;
pub mod technical;
pub mod ux;

use crate::error::{ForgeError, Result};
use crate::types::Stage;
use serde::{Deserialize, Serialize};

pub use idea::IdeaRefinement;
pub use playbook::ImplementationPlaybook;
pub use prd::PrdDocument;
pub use technical::TechnicalAnalysis;
pub use ux::UxRequirements;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", content = "data", rename_all = "snake_case")]
pub enum StageData {
    IdeaRefinement(IdeaRefinement),
    PrdGeneration(PrdDocument),
    UxRequirements(UxRequirements),
    TechnicalAnalysis(TechnicalAnalysis),
    ImplementationPlaybook(ImplementationPlaybook),
}

impl StageData {
    pub fn stage(&self) -> Stage {
        match self {
            StageData::IdeaRefinement(_) => Stage::IdeaRefinement,
            StageData::PrdGeneration(_) => Stage::PrdGeneration,
            StageData::UxRequirements(_) => Stage::UxRequirements,
            StageData::TechnicalAnalysis(_) => Stage::TechnicalAnalysis,
            StageData::ImplementationPlaybook(_) => Stage::ImplementationPlaybook,
        }
    }

    pub fn missing_required(&self) -> Vec<&'static str> {
        match self {
            StageData::IdeaRefinement(d) => d.missing_required(),
            StageData::PrdGeneration(d) => d.missing_required(),
            StageData::UxRequirements(d) => d.missing_required(),
            StageData::TechnicalAnalysis(d) => d.missing_required(),
            StageData::ImplementationPlaybook(d) => d.missing_required(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.missing_required().is_empty()
    }

    /// Empty payload for `stage`, the starting point of a stage form.
    pub fn empty(stage: Stage) -> Self {
        match stage {
            Stage::IdeaRefinement => StageData::IdeaRefinement(IdeaRefinement::default()),
            Stage::PrdGeneration => StageData::PrdGeneration(PrdDocument::default()),
            Stage::UxRequirements => StageData::UxRequirements(UxRequirements::default()),
            Stage::TechnicalAnalysis => StageData::TechnicalAnalysis(TechnicalAnalysis::default()),
            Stage::ImplementationPlaybook => {
                StageData::ImplementationPlaybook(ImplementationPlaybook::default())
            }
        }
    }

    /// Parse an untagged JSON payload as the data for `stage`.
    pub fn from_value(stage: Stage, value: serde_json::Value) -> Result<Self> {
        let invalid = |e: serde_json::Error| ForgeError::InvalidPayload {
            stage: stage.to_string(),
            reason: e.to_string(),
        };
        Ok(match stage {
            Stage::IdeaRefinement => {
                StageData::IdeaRefinement(serde_json::from_value(value).map_err(invalid)?)
            }
            Stage::PrdGeneration => {
                StageData::PrdGeneration(serde_json::from_value(value).map_err(invalid)?)
            }
            Stage::UxRequirements => {
                StageData::UxRequirements(serde_json::from_value(value).map_err(invalid)?)
            }
            Stage::TechnicalAnalysis => {
                StageData::TechnicalAnalysis(serde_json::from_value(value).map_err(invalid)?)
            }
            Stage::ImplementationPlaybook => {
                StageData::ImplementationPlaybook(serde_json::from_value(value).map_err(invalid)?)
            }
        })
    }

    /// The untagged JSON form sent to the API as stage context.
    pub fn to_value(&self) -> Result<serde_json::Value> {
        let value = match self {
            StageData::IdeaRefinement(d) => serde_json::to_value(d)?,
            StageData::PrdGeneration(d) => serde_json::to_value(d)?,
            StageData::UxRequirements(d) => serde_json::to_value(d)?,
            StageData::TechnicalAnalysis(d) => serde_json::to_value(d)?,
            StageData::ImplementationPlaybook(d) => serde_json::to_value(d)?,
        };
        Ok(value)
    }

    /// Shallow-merge a generation response into this payload. Keys present in
    /// `patch` replace existing keys; the result must still parse for the stage.
    pub fn merge(&mut self, patch: serde_json::Value) -> Result<()> {
        let stage = self.stage();
        let mut current = self.to_value()?;
        match (current.as_object_mut(), patch) {
            (Some(obj), serde_json::Value::Object(patch)) => {
                for (k, v) in patch {
                    obj.insert(k, v);
                }
            }
            (_, other) => {
                return Err(ForgeError::InvalidPayload {
                    stage: stage.to_string(),
                    reason: format!("expected a JSON object, got {other}"),
                })
            }
        }
        *self = StageData::from_value(stage, current)?;
        Ok(())
    }
}
