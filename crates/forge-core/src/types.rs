use crate::error::ForgeError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    IdeaRefinement,
    PrdGeneration,
    UxRequirements,
    TechnicalAnalysis,
    ImplementationPlaybook,
}

impl Stage {
    pub fn all() -> &'static [Stage] {
        &[
            Stage::IdeaRefinement,
            Stage::PrdGeneration,
            Stage::UxRequirements,
            Stage::TechnicalAnalysis,
            Stage::ImplementationPlaybook,
        ]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<Stage> {
        Stage::all().get(self.index() + 1).copied()
    }

    pub fn previous(self) -> Option<Stage> {
        self.index().checked_sub(1).map(|i| Stage::all()[i])
    }

    pub fn is_last(self) -> bool {
        self.next().is_none()
    }

    /// Only UX requirements may be skipped outright.
    pub fn is_skippable(self) -> bool {
        matches!(self, Stage::UxRequirements)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::IdeaRefinement => "idea_refinement",
            Stage::PrdGeneration => "prd_generation",
            Stage::UxRequirements => "ux_requirements",
            Stage::TechnicalAnalysis => "technical_analysis",
            Stage::ImplementationPlaybook => "implementation_playbook",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::IdeaRefinement => "Idea Refinement",
            Stage::PrdGeneration => "PRD Generation",
            Stage::UxRequirements => "UX Requirements",
            Stage::TechnicalAnalysis => "Technical Analysis",
            Stage::ImplementationPlaybook => "Implementation Playbook",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Stage {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idea_refinement" | "idea-refinement" | "idea" => Ok(Stage::IdeaRefinement),
            "prd_generation" | "prd-generation" | "prd" => Ok(Stage::PrdGeneration),
            "ux_requirements" | "ux-requirements" | "ux" => Ok(Stage::UxRequirements),
            "technical_analysis" | "technical-analysis" | "technical" => {
                Ok(Stage::TechnicalAnalysis)
            }
            "implementation_playbook" | "implementation-playbook" | "playbook" => {
                Ok(Stage::ImplementationPlaybook)
            }
            _ => Err(ForgeError::InvalidStage(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// ProjectStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Draft,
    Active,
    OnHold,
    Completed,
    Archived,
    Cancelled,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Draft => "draft",
            ProjectStatus::Active => "active",
            ProjectStatus::OnHold => "on_hold",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Archived => "archived",
            ProjectStatus::Cancelled => "cancelled",
        }
    }

    /// Statuses in which stage work may still be submitted.
    pub fn is_open(self) -> bool {
        matches!(self, ProjectStatus::Draft | ProjectStatus::Active)
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ProjectStatus::Draft),
            "active" => Ok(ProjectStatus::Active),
            "on_hold" | "on-hold" => Ok(ProjectStatus::OnHold),
            "completed" => Ok(ProjectStatus::Completed),
            "archived" => Ok(ProjectStatus::Archived),
            "cancelled" => Ok(ProjectStatus::Cancelled),
            _ => Err(ForgeError::InvalidValue {
                field: "status",
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            _ => Err(ForgeError::InvalidValue {
                field: "priority",
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// UserRole
// ---------------------------------------------------------------------------

/// Ordered by privilege, guest lowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Guest,
    User,
    Expert,
    Admin,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Guest => "guest",
            UserRole::User => "user",
            UserRole::Expert => "expert",
            UserRole::Admin => "admin",
        }
    }

    pub fn can_override_gate(self) -> bool {
        matches!(self, UserRole::Expert | UserRole::Admin)
    }

    pub fn can_rollback(self) -> bool {
        matches!(self, UserRole::Expert | UserRole::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "guest" => Ok(UserRole::Guest),
            "user" => Ok(UserRole::User),
            "expert" => Ok(UserRole::Expert),
            "admin" => Ok(UserRole::Admin),
            _ => Err(ForgeError::InvalidValue {
                field: "role",
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// ExportFormat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Json,
    Markdown,
    Pdf,
    Zip,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Markdown => "markdown",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Zip => "zip",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Markdown => "md",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Zip => "zip",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Markdown => "text/markdown; charset=utf-8",
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Zip => "application/zip",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(ExportFormat::Json),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "pdf" => Ok(ExportFormat::Pdf),
            "zip" => Ok(ExportFormat::Zip),
            _ => Err(ForgeError::InvalidValue {
                field: "format",
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
