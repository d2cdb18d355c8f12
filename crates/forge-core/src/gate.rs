use crate::config::QualityConfig;
use crate::quality::{GateStatus, QualityThresholds};
use crate::types::{Priority, Stage, UserRole};
use serde::{Deserialize, Serialize};

/// Boundary-inclusive pass check: a score equal to the threshold passes.
pub fn passes(score: u32, threshold: u32) -> bool {
    score >= threshold
}

// ---------------------------------------------------------------------------
// Threshold derivation
// ---------------------------------------------------------------------------

fn priority_delta(priority: Priority) -> i32 {
    match priority {
        Priority::Critical => 5,
        Priority::High => 2,
        Priority::Medium => 0,
        Priority::Low => -5,
    }
}

fn shift(value: u32, delta: i32) -> u32 {
    (value as i64 + delta as i64).clamp(0, 100) as u32
}

/// Thresholds for `stage`, with priority adjustments applied when enabled.
pub fn thresholds_for(stage: Stage, cfg: &QualityConfig, priority: Priority) -> QualityThresholds {
    let base = cfg.minimum_for(stage).min(100);
    let mut minimum = base;
    let mut adjustments_applied = Vec::new();

    if cfg.priority_adjustments {
        let delta = priority_delta(priority);
        if delta != 0 {
            minimum = shift(base, delta);
            adjustments_applied.push(format!("priority {priority}: {delta:+}"));
        }
    }

    let recommended = minimum.saturating_add(cfg.recommended_margin).min(100);
    QualityThresholds {
        minimum,
        recommended,
        adjustments_applied,
    }
}

/// Tri-state classification of a score against the stage thresholds.
pub fn classify(score: u32, thresholds: &QualityThresholds) -> GateStatus {
    if !passes(score, thresholds.minimum) {
        GateStatus::Block
    } else if !passes(score, thresholds.recommended) {
        GateStatus::Caution
    } else {
        GateStatus::Excellent
    }
}

// ---------------------------------------------------------------------------
// GateDecision
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GateDecision {
    Pass {
        score: u32,
        status: GateStatus,
    },
    Block {
        score: u32,
        minimum: u32,
        can_override: bool,
    },
    /// Progress allowed by an expert; the score itself is untouched.
    Overridden {
        score: u32,
        minimum: u32,
        by: UserRole,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateStyle {
    Pass,
    BelowThreshold,
}

impl GateStyle {
    pub fn label(self) -> &'static str {
        match self {
            GateStyle::Pass => "Pass",
            GateStyle::BelowThreshold => "Below Threshold",
        }
    }
}

impl GateDecision {
    pub fn allows_progress(&self) -> bool {
        !matches!(self, GateDecision::Block { .. })
    }

    pub fn score(&self) -> u32 {
        match self {
            GateDecision::Pass { score, .. }
            | GateDecision::Block { score, .. }
            | GateDecision::Overridden { score, .. } => *score,
        }
    }

    /// Display affordance. An overridden gate still renders as below threshold.
    pub fn style(&self) -> GateStyle {
        match self {
            GateDecision::Pass { .. } => GateStyle::Pass,
            GateDecision::Block { .. } | GateDecision::Overridden { .. } => {
                GateStyle::BelowThreshold
            }
        }
    }

    pub fn outcome_label(&self) -> String {
        match self {
            GateDecision::Pass { status, .. } => format!("passed ({status})"),
            GateDecision::Block { .. } => "blocked".to_string(),
            GateDecision::Overridden { by, .. } => format!("overridden by {by}"),
        }
    }
}

// ---------------------------------------------------------------------------
// QualityGate
// ---------------------------------------------------------------------------

/// Receives exactly one callback per gate run.
pub trait GateHandler {
    fn on_pass(&mut self, score: u32, status: GateStatus);
    fn on_block(&mut self, score: u32, minimum: u32);
    fn on_override(&mut self, score: u32, minimum: u32, by: UserRole);
}

pub struct QualityGate<'a> {
    pub thresholds: &'a QualityThresholds,
}

impl<'a> QualityGate<'a> {
    pub fn new(thresholds: &'a QualityThresholds) -> Self {
        Self { thresholds }
    }

    pub fn evaluate(&self, score: u32, role: UserRole, override_requested: bool) -> GateDecision {
        let minimum = self.thresholds.minimum;
        match classify(score, self.thresholds) {
            GateStatus::Block if override_requested && role.can_override_gate() => {
                GateDecision::Overridden {
                    score,
                    minimum,
                    by: role,
                }
            }
            GateStatus::Block => GateDecision::Block {
                score,
                minimum,
                can_override: role.can_override_gate(),
            },
            status => GateDecision::Pass { score, status },
        }
    }

    pub fn run<H: GateHandler>(
        &self,
        score: u32,
        role: UserRole,
        override_requested: bool,
        handler: &mut H,
    ) -> GateDecision {
        let decision = self.evaluate(score, role, override_requested);
        match &decision {
            GateDecision::Pass { score, status } => handler.on_pass(*score, *status),
            GateDecision::Block { score, minimum, .. } => handler.on_block(*score, *minimum),
            GateDecision::Overridden { score, minimum, by } => {
                handler.on_override(*score, *minimum, *by)
            }
        }
        decision
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
