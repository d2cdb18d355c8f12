use forge_core::quality::QualityAssessment;
use forge_core::stages::playbook::{CompiledPlaybook, ContextValidation};
use forge_core::stages::prd::UserStory;
use forge_core::stages::technical::{ConsensusSummary, ModelAnalysis};
use forge_core::stages::ux::AccessibilityItem;
use forge_core::types::{Priority, Stage};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Request / response envelopes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub project_id: String,
    pub stage: Stage,
    /// Accumulated stage context, `{stage: payload}`.
    #[serde(default)]
    pub context: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Project priority, so server-side assessments use the same thresholds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl GenerationRequest {
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostTracking {
    #[serde(default)]
    pub total_cost: f64,
    #[serde(default)]
    pub tokens_used: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub breakdown: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub content: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_assessment: Option<QualityAssessment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_tracking: Option<CostTracking>,
}

impl<T> ApiResponse<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            content: f(self.content),
            quality_assessment: self.quality_assessment,
            cost_tracking: self.cost_tracking,
        }
    }
}

// ---------------------------------------------------------------------------
// Typed content for endpoints with a fixed shape. Each is also a valid
// patch for its stage payload.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStoriesContent {
    pub user_stories: Vec<UserStory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityContent {
    pub accessibility: Vec<AccessibilityItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusContent {
    pub consensus: ConsensusSummary,
    #[serde(default)]
    pub model_analyses: Vec<ModelAnalysis>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledContent {
    pub compiled: CompiledPlaybook,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextValidationContent {
    pub context_validation: ContextValidation,
}

/// Body of a failed request: `{"error": "..."}` or `{"message": "..."}`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.error.or(self.message).filter(|m| !m.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_without_optional_fields() {
        let resp: ApiResponse<serde_json::Value> =
            serde_json::from_value(json!({"content": {"problemStatement": "x"}})).unwrap();
        assert!(resp.quality_assessment.is_none());
        assert!(resp.cost_tracking.is_none());
    }

    #[test]
    fn request_wire_names() {
        let req = GenerationRequest {
            project_id: "p".to_string(),
            stage: Stage::UxRequirements,
            context: json!({}),
            model: Some("gpt-4o".to_string()),
            priority: None,
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["projectId"], "p");
        assert_eq!(v["stage"], "ux_requirements");
        assert!(v.get("priority").is_none());

        let v = serde_json::to_value(req.with_priority(Priority::High)).unwrap();
        assert_eq!(v["priority"], "high");
    }

    #[test]
    fn error_body_prefers_error_field() {
        let body: ErrorBody =
            serde_json::from_value(json!({"error": "boom", "message": "other"})).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("boom"));
        let body: ErrorBody = serde_json::from_value(json!({"message": "  "})).unwrap();
        assert_eq!(body.into_message(), None);
    }
}
