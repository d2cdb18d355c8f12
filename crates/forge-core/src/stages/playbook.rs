use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodingPrompt {
    pub title: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowPhase {
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevelopmentWorkflow {
    #[serde(default)]
    pub phases: Vec<WorkflowPhase>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestingStrategy {
    #[serde(default)]
    pub unit: Vec<String>,
    #[serde(default)]
    pub integration: Vec<String>,
    #[serde(default)]
    pub end_to_end: Vec<String>,
    #[serde(default)]
    pub coverage_target: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentGuide {
    #[serde(default)]
    pub environments: Vec<String>,
    #[serde(default)]
    pub steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybookSection {
    pub heading: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledPlaybook {
    pub title: String,
    pub sections: Vec<PlaybookSection>,
    pub compiled_at: DateTime<Utc>,
}

impl CompiledPlaybook {
    pub fn to_markdown(&self) -> String {
        let mut out = format!("# {}\n\n", self.title);
        let _ = writeln!(out, "_Compiled {}_\n", self.compiled_at.to_rfc3339());
        for section in &self.sections {
            let _ = writeln!(out, "## {}\n\n{}\n", section.heading, section.body.trim_end());
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextValidation {
    /// 0 to 100: how well the playbook reflects earlier stages.
    pub integration_score: u32,
    #[serde(default)]
    pub gaps: Vec<String>,
}

/// The generation steps of the playbook stage, in the order they unlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybookStep {
    CodingPrompts,
    DevelopmentWorkflow,
    TestingStrategy,
    DeploymentGuide,
    Compile,
    ValidateContext,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImplementationPlaybook {
    #[serde(default)]
    pub coding_prompts: Vec<CodingPrompt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub development_workflow: Option<DevelopmentWorkflow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub testing_strategy: Option<TestingStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_guide: Option<DeploymentGuide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiled: Option<CompiledPlaybook>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_validation: Option<ContextValidation>,
}

impl ImplementationPlaybook {
    pub fn is_step_done(&self, step: PlaybookStep) -> bool {
        match step {
            PlaybookStep::CodingPrompts => !self.coding_prompts.is_empty(),
            PlaybookStep::DevelopmentWorkflow => self.development_workflow.is_some(),
            PlaybookStep::TestingStrategy => self.testing_strategy.is_some(),
            PlaybookStep::DeploymentGuide => self.deployment_guide.is_some(),
            PlaybookStep::Compile => self.compiled.is_some(),
            PlaybookStep::ValidateContext => self.context_validation.is_some(),
        }
    }

    /// Compilation needs all four content sections.
    pub fn can_compile(&self) -> bool {
        [
            PlaybookStep::CodingPrompts,
            PlaybookStep::DevelopmentWorkflow,
            PlaybookStep::TestingStrategy,
            PlaybookStep::DeploymentGuide,
        ]
        .iter()
        .all(|&s| self.is_step_done(s))
    }

    /// Export is disabled until a compiled playbook exists.
    pub fn export_enabled(&self) -> bool {
        self.compiled.is_some()
    }

    /// Assemble a compiled playbook from the four content sections.
    pub fn compile(&self, title: impl Into<String>, at: DateTime<Utc>) -> Option<CompiledPlaybook> {
        if !self.can_compile() {
            return None;
        }
        let mut sections = Vec::new();

        let mut prompts = String::new();
        for p in &self.coding_prompts {
            let _ = writeln!(prompts, "### {}\n\n{}\n", p.title, p.prompt);
        }
        sections.push(PlaybookSection {
            heading: "Coding Prompts".to_string(),
            body: prompts,
        });

        if let Some(workflow) = &self.development_workflow {
            let mut body = String::new();
            for phase in &workflow.phases {
                let _ = writeln!(body, "### {}", phase.name);
                for task in &phase.tasks {
                    let _ = writeln!(body, "- {task}");
                }
                body.push('\n');
            }
            sections.push(PlaybookSection {
                heading: "Development Workflow".to_string(),
                body,
            });
        }

        if let Some(testing) = &self.testing_strategy {
            let mut body = format!("Coverage target: {}%\n\n", testing.coverage_target);
            for (label, items) in [
                ("Unit", &testing.unit),
                ("Integration", &testing.integration),
                ("End-to-end", &testing.end_to_end),
            ] {
                if items.is_empty() {
                    continue;
                }
                let _ = writeln!(body, "**{label}**");
                for item in items {
                    let _ = writeln!(body, "- {item}");
                }
                body.push('\n');
            }
            sections.push(PlaybookSection {
                heading: "Testing Strategy".to_string(),
                body,
            });
        }

        if let Some(guide) = &self.deployment_guide {
            let mut body = String::new();
            if !guide.environments.is_empty() {
                let _ = writeln!(body, "Environments: {}\n", guide.environments.join(", "));
            }
            for (i, step) in guide.steps.iter().enumerate() {
                let _ = writeln!(body, "{}. {step}", i + 1);
            }
            sections.push(PlaybookSection {
                heading: "Deployment Guide".to_string(),
                body,
            });
        }

        Some(CompiledPlaybook {
            title: title.into(),
            sections,
            compiled_at: at,
        })
    }

    pub fn missing_required(&self) -> Vec<&'static str> {
        if self.compiled.is_some() {
            Vec::new()
        } else {
            vec!["compiled"]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready() -> ImplementationPlaybook {
        ImplementationPlaybook {
            coding_prompts: vec![CodingPrompt {
                title: "Scaffold API".to_string(),
                prompt: "Create the prompt CRUD endpoints".to_string(),
                target_model: None,
            }],
            development_workflow: Some(DevelopmentWorkflow {
                phases: vec![WorkflowPhase {
                    name: "Foundation".to_string(),
                    tasks: vec!["Set up CI".to_string()],
                }],
            }),
            testing_strategy: Some(TestingStrategy {
                unit: vec!["gate thresholds".to_string()],
                coverage_target: 80,
                ..Default::default()
            }),
            deployment_guide: Some(DeploymentGuide {
                environments: vec!["staging".to_string(), "production".to_string()],
                steps: vec!["Provision resources".to_string(), "Deploy".to_string()],
            }),
            ..Default::default()
        }
    }

    #[test]
    fn export_disabled_until_compiled() {
        let mut playbook = ready();
        assert!(!playbook.export_enabled());
        playbook.compiled = playbook.compile("Sutra", Utc::now());
        assert!(playbook.export_enabled());
        assert!(playbook.missing_required().is_empty());
    }

    #[test]
    fn compile_requires_all_sections() {
        let mut playbook = ready();
        playbook.testing_strategy = None;
        assert!(!playbook.can_compile());
        assert!(playbook.compile("Sutra", Utc::now()).is_none());
    }

    #[test]
    fn compiled_markdown_has_every_section() {
        let compiled = ready().compile("Sutra Playbook", Utc::now()).unwrap();
        assert_eq!(compiled.sections.len(), 4);
        let md = compiled.to_markdown();
        assert!(md.starts_with("# Sutra Playbook"));
        assert!(md.contains("## Coding Prompts"));
        assert!(md.contains("### Scaffold API"));
        assert!(md.contains("Coverage target: 80%"));
        assert!(md.contains("1. Provision resources"));
    }

    #[test]
    fn step_tracking() {
        let playbook = ImplementationPlaybook::default();
        assert!(!playbook.is_step_done(PlaybookStep::CodingPrompts));
        assert!(!playbook.is_step_done(PlaybookStep::ValidateContext));
        assert!(ready().is_step_done(PlaybookStep::DeploymentGuide));
    }
}
