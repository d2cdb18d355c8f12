use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaRefinement {
    #[serde(default)]
    pub problem_statement: String,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub value_proposition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_context: Option<String>,
    #[serde(default)]
    pub success_metrics: Vec<String>,
    #[serde(default)]
    pub constraints: Vec<String>,
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

impl IdeaRefinement {
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if blank(&self.problem_statement) {
            missing.push("problemStatement");
        }
        if blank(&self.target_audience) {
            missing.push("targetAudience");
        }
        if blank(&self.value_proposition) {
            missing.push("valueProposition");
        }
        missing
    }

    /// Gates the "Complete Idea Refinement" action.
    pub fn can_complete(&self) -> bool {
        self.missing_required().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> IdeaRefinement {
        IdeaRefinement {
            problem_statement: "Prompt work is scattered across tools".to_string(),
            target_audience: "Product teams".to_string(),
            value_proposition: "One place to refine and reuse prompts".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn empty_problem_statement_blocks_completion() {
        let mut idea = filled();
        idea.problem_statement = String::new();
        assert!(!idea.can_complete());
        assert_eq!(idea.missing_required(), vec!["problemStatement"]);
    }

    #[test]
    fn whitespace_counts_as_empty() {
        let mut idea = filled();
        idea.target_audience = "   \n".to_string();
        assert_eq!(idea.missing_required(), vec!["targetAudience"]);
    }

    #[test]
    fn complete_when_required_fields_present() {
        assert!(filled().can_complete());
    }

    #[test]
    fn parses_partial_camel_case() {
        let idea: IdeaRefinement =
            serde_json::from_str(r#"{"problemStatement": "x", "successMetrics": ["DAU"]}"#)
                .unwrap();
        assert_eq!(idea.success_metrics, vec!["DAU"]);
        assert_eq!(
            idea.missing_required(),
            vec!["targetAudience", "valueProposition"]
        );
    }
}
