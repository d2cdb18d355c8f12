use crate::error::ClientError;
use forge_core::types::Stage;
use std::fmt;

/// Every route under `/api/forge/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    AnalyzeIdea,
    RefineIdea,
    ExtractRequirements,
    GenerateUserStories,
    PrioritizeFeatures,
    GeneratePrdDocument,
    GenerateUserJourneys,
    GenerateWireframes,
    GenerateComponentSpecs,
    ValidateAccessibility,
    AnalyzeArchitecture,
    EvaluateArchitectureConsensus,
    AssessTechnicalRisks,
    GenerateCodingPrompts,
    CreateDevelopmentWorkflow,
    GenerateTestingStrategy,
    CreateDeploymentGuide,
    CompilePlaybook,
    ValidateContextIntegration,
    AssessQuality,
    ExportPlaybook,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Endpoint {
    pub fn all() -> &'static [Endpoint] {
        use Endpoint::*;
        &[
            AnalyzeIdea,
            RefineIdea,
            ExtractRequirements,
            GenerateUserStories,
            PrioritizeFeatures,
            GeneratePrdDocument,
            GenerateUserJourneys,
            GenerateWireframes,
            GenerateComponentSpecs,
            ValidateAccessibility,
            AnalyzeArchitecture,
            EvaluateArchitectureConsensus,
            AssessTechnicalRisks,
            GenerateCodingPrompts,
            CreateDevelopmentWorkflow,
            GenerateTestingStrategy,
            CreateDeploymentGuide,
            CompilePlaybook,
            ValidateContextIntegration,
            AssessQuality,
            ExportPlaybook,
        ]
    }

    /// Path segment after `/api/forge/`.
    pub fn path(self) -> &'static str {
        use Endpoint::*;
        match self {
            AnalyzeIdea => "analyze-idea",
            RefineIdea => "refine-idea",
            ExtractRequirements => "extract-requirements",
            GenerateUserStories => "generate-user-stories",
            PrioritizeFeatures => "prioritize-features",
            GeneratePrdDocument => "generate-prd-document",
            GenerateUserJourneys => "generate-user-journeys",
            GenerateWireframes => "generate-wireframes",
            GenerateComponentSpecs => "generate-component-specs",
            ValidateAccessibility => "validate-accessibility",
            AnalyzeArchitecture => "analyze-architecture",
            EvaluateArchitectureConsensus => "evaluate-architecture-consensus",
            AssessTechnicalRisks => "assess-technical-risks",
            GenerateCodingPrompts => "generate-coding-prompts",
            CreateDevelopmentWorkflow => "create-development-workflow",
            GenerateTestingStrategy => "generate-testing-strategy",
            CreateDeploymentGuide => "create-deployment-guide",
            CompilePlaybook => "compile-playbook",
            ValidateContextIntegration => "validate-context-integration",
            AssessQuality => "assess-quality",
            ExportPlaybook => "export-playbook",
        }
    }

    /// Owning stage. `assess-quality` serves every stage.
    pub fn stage(self) -> Option<Stage> {
        use Endpoint::*;
        match self {
            AnalyzeIdea | RefineIdea => Some(Stage::IdeaRefinement),
            ExtractRequirements | GenerateUserStories | PrioritizeFeatures
            | GeneratePrdDocument => Some(Stage::PrdGeneration),
            GenerateUserJourneys | GenerateWireframes | GenerateComponentSpecs
            | ValidateAccessibility => Some(Stage::UxRequirements),
            AnalyzeArchitecture | EvaluateArchitectureConsensus | AssessTechnicalRisks => {
                Some(Stage::TechnicalAnalysis)
            }
            GenerateCodingPrompts
            | CreateDevelopmentWorkflow
            | GenerateTestingStrategy
            | CreateDeploymentGuide
            | CompilePlaybook
            | ValidateContextIntegration
            | ExportPlaybook => Some(Stage::ImplementationPlaybook),
            AssessQuality => None,
        }
    }

    /// POST routes that produce content and count against a guest allowance.
    pub fn is_generation(self) -> bool {
        self.method() == Method::Post && self != Endpoint::AssessQuality
    }

    pub fn method(self) -> Method {
        match self {
            Endpoint::ExportPlaybook => Method::Get,
            _ => Method::Post,
        }
    }

    /// Generation endpoints that belong to `stage`, in the order the UI offers them.
    pub fn for_stage(stage: Stage) -> Vec<Endpoint> {
        Endpoint::all()
            .iter()
            .copied()
            .filter(|e| e.method() == Method::Post && e.stage() == Some(stage))
            .collect()
    }

    /// Sequencing slot for a request from `project_id`.
    pub fn slot(self, project_id: &str) -> String {
        format!("{project_id}:{}", self.path())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl std::str::FromStr for Endpoint {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().trim_start_matches('/');
        let key = key.strip_prefix("api/forge/").unwrap_or(key);
        Endpoint::all()
            .iter()
            .copied()
            .find(|e| e.path() == key)
            .ok_or_else(|| ClientError::UnknownEndpoint(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_parse_back() {
        for &e in Endpoint::all() {
            assert_eq!(e.path().parse::<Endpoint>().unwrap(), e);
        }
        assert_eq!(
            "/api/forge/compile-playbook".parse::<Endpoint>().unwrap(),
            Endpoint::CompilePlaybook
        );
        assert!("generate-everything".parse::<Endpoint>().is_err());
    }

    #[test]
    fn stage_grouping() {
        assert_eq!(
            Endpoint::for_stage(Stage::IdeaRefinement),
            vec![Endpoint::AnalyzeIdea, Endpoint::RefineIdea]
        );
        assert_eq!(Endpoint::for_stage(Stage::PrdGeneration).len(), 4);
        assert_eq!(Endpoint::for_stage(Stage::UxRequirements).len(), 4);
        assert_eq!(Endpoint::for_stage(Stage::TechnicalAnalysis).len(), 3);
        // Export is a GET and not part of generation.
        assert_eq!(Endpoint::for_stage(Stage::ImplementationPlaybook).len(), 6);
        assert_eq!(Endpoint::AssessQuality.stage(), None);
    }

    #[test]
    fn export_is_get() {
        assert_eq!(Endpoint::ExportPlaybook.method(), Method::Get);
        assert_eq!(Endpoint::CompilePlaybook.method(), Method::Post);
    }

    #[test]
    fn generation_excludes_assessment_and_export() {
        assert!(Endpoint::AnalyzeIdea.is_generation());
        assert!(Endpoint::CompilePlaybook.is_generation());
        assert!(!Endpoint::AssessQuality.is_generation());
        assert!(!Endpoint::ExportPlaybook.is_generation());
    }
}
