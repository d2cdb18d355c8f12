use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// GateStatus
// ---------------------------------------------------------------------------

/// Tri-state outcome of a quality gate, as emitted by the assessment API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GateStatus {
    Block,
    Caution,
    Excellent,
}

impl GateStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GateStatus::Block => "BLOCK",
            GateStatus::Caution => "CAUTION",
            GateStatus::Excellent => "EXCELLENT",
        }
    }

    pub fn allows_progress(self) -> bool {
        !matches!(self, GateStatus::Block)
    }
}

impl fmt::Display for GateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// QualityThresholds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityThresholds {
    pub minimum: u32,
    pub recommended: u32,
    #[serde(default)]
    pub adjustments_applied: Vec<String>,
}

// ---------------------------------------------------------------------------
// QualityAssessment
// ---------------------------------------------------------------------------

/// Server-produced assessment of a stage's content. Read-only on the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityAssessment {
    /// Score from 0 to 100.
    pub overall_score: u32,
    #[serde(default)]
    pub dimension_scores: BTreeMap<String, u32>,
    pub quality_gate_status: GateStatus,
    /// 0.0 to 1.0.
    #[serde(default)]
    pub confidence_level: f64,
    pub thresholds: QualityThresholds,
}

impl QualityAssessment {
    /// The `n` lowest scoring dimensions, lowest first.
    pub fn weakest_dimensions(&self, n: usize) -> Vec<(&str, u32)> {
        let mut dims: Vec<(&str, u32)> = self
            .dimension_scores
            .iter()
            .map(|(k, v)| (k.as_str(), *v))
            .collect();
        dims.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(b.0)));
        dims.truncate(n);
        dims
    }

    /// Dimensions scoring below the assessment's minimum threshold.
    pub fn failing_dimensions(&self) -> Vec<&str> {
        self.dimension_scores
            .iter()
            .filter(|(_, v)| **v < self.thresholds.minimum)
            .map(|(k, _)| k.as_str())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
