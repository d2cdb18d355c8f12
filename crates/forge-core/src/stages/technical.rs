use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchitectureRecommendation {
    #[serde(default)]
    pub pattern: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub tech_stack: Vec<String>,
}

/// One model's independent take on the architecture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelAnalysis {
    pub model: String,
    pub recommendation: String,
    /// 0.0 to 1.0.
    #[serde(default)]
    pub confidence: f64,
}

/// Agreement summary produced by the server's consensus step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusSummary {
    /// 0 to 100.
    pub agreement_score: u32,
    pub recommended_approach: String,
    #[serde(default)]
    pub dissenting_models: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low = 1,
    Medium = 2,
    High = 3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub description: String,
    pub likelihood: RiskLevel,
    pub impact: RiskLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mitigation: Option<String>,
}

impl RiskAssessment {
    /// likelihood × impact, 1 to 9.
    pub fn score(&self) -> u32 {
        self.likelihood as u32 * self.impact as u32
    }

    pub fn is_critical(&self) -> bool {
        self.score() >= 6
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeasibilityAssessment {
    pub technical: u32,
    pub resource: u32,
    pub timeline: u32,
}

impl FeasibilityAssessment {
    pub fn overall(&self) -> u32 {
        (self.technical + self.resource + self.timeline) / 3
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalAnalysis {
    #[serde(default)]
    pub architecture: ArchitectureRecommendation,
    #[serde(default)]
    pub model_analyses: Vec<ModelAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consensus: Option<ConsensusSummary>,
    #[serde(default)]
    pub risks: Vec<RiskAssessment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feasibility: Option<FeasibilityAssessment>,
}

impl TechnicalAnalysis {
    /// Risks ordered highest score first.
    pub fn ranked_risks(&self) -> Vec<&RiskAssessment> {
        let mut risks: Vec<&RiskAssessment> = self.risks.iter().collect();
        risks.sort_by(|a, b| b.score().cmp(&a.score()));
        risks
    }

    /// Critical risks that have no mitigation recorded.
    pub fn unmitigated_critical_risks(&self) -> Vec<&RiskAssessment> {
        self.risks
            .iter()
            .filter(|r| {
                r.is_critical()
                    && r
                        .mitigation
                        .as_deref()
                        .map_or(true, |m| m.trim().is_empty())
            })
            .collect()
    }

    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.architecture.pattern.trim().is_empty() {
            missing.push("architecture.pattern");
        }
        if self.feasibility.is_none() {
            missing.push("feasibility");
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn risk(likelihood: RiskLevel, impact: RiskLevel, mitigation: Option<&str>) -> RiskAssessment {
        RiskAssessment {
            description: format!("{likelihood:?}/{impact:?}"),
            likelihood,
            impact,
            mitigation: mitigation.map(str::to_string),
        }
    }

    #[test]
    fn risk_score_is_product() {
        assert_eq!(risk(RiskLevel::Low, RiskLevel::Low, None).score(), 1);
        assert_eq!(risk(RiskLevel::Medium, RiskLevel::High, None).score(), 6);
        assert_eq!(risk(RiskLevel::High, RiskLevel::High, None).score(), 9);
        assert!(risk(RiskLevel::High, RiskLevel::Medium, None).is_critical());
        assert!(!risk(RiskLevel::Medium, RiskLevel::Medium, None).is_critical());
    }

    #[test]
    fn ranks_and_filters_risks() {
        let analysis = TechnicalAnalysis {
            risks: vec![
                risk(RiskLevel::Low, RiskLevel::Medium, None),
                risk(RiskLevel::High, RiskLevel::High, Some("shard early")),
                risk(RiskLevel::High, RiskLevel::Medium, Some("  ")),
            ],
            ..Default::default()
        };
        let scores: Vec<u32> = analysis.ranked_risks().iter().map(|r| r.score()).collect();
        assert_eq!(scores, vec![9, 6, 2]);
        assert_eq!(analysis.unmitigated_critical_risks().len(), 1);
    }

    #[test]
    fn feasibility_mean() {
        let f = FeasibilityAssessment {
            technical: 90,
            resource: 70,
            timeline: 80,
        };
        assert_eq!(f.overall(), 80);
    }

    #[test]
    fn required_fields() {
        let mut analysis = TechnicalAnalysis::default();
        assert_eq!(
            analysis.missing_required(),
            vec!["architecture.pattern", "feasibility"]
        );
        analysis.architecture.pattern = "serverless".to_string();
        analysis.feasibility = Some(FeasibilityAssessment::default());
        assert!(analysis.missing_required().is_empty());
    }
}
