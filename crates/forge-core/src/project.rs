use crate::error::Result;
use crate::paths;
use crate::types::{Priority, ProjectStatus, Stage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// StageTransition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageOutcome {
    Completed,
    Overridden,
    Skipped,
    RolledBack,
}

impl StageOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            StageOutcome::Completed => "completed",
            StageOutcome::Overridden => "overridden",
            StageOutcome::Skipped => "skipped",
            StageOutcome::RolledBack => "rolled_back",
        }
    }
}

impl std::fmt::Display for StageOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTransition {
    pub stage: Stage,
    pub entered: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exited: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<StageOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
}

// ---------------------------------------------------------------------------
// ForgeProject
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgeProject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub current_stage: Stage,
    pub status: ProjectStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub progress_percentage: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub collaborators_count: u32,
    #[serde(default)]
    pub artifacts_count: u32,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub stage_history: Vec<StageTransition>,
}

impl ForgeProject {
    pub fn new(id: impl Into<String>, name: impl Into<String>, owner_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            current_stage: Stage::IdeaRefinement,
            status: ProjectStatus::Draft,
            priority: Priority::default(),
            progress_percentage: 0,
            tags: Vec::new(),
            collaborators_count: 1,
            artifacts_count: 0,
            owner_id: owner_id.into(),
            created_at: now,
            updated_at: now,
            stage_history: vec![StageTransition {
                stage: Stage::IdeaRefinement,
                entered: now,
                exited: None,
                outcome: None,
                score: None,
            }],
        }
    }

    /// Validates the id before constructing.
    pub fn create(
        id: impl Into<String>,
        name: impl Into<String>,
        owner_id: impl Into<String>,
    ) -> Result<Self> {
        let id = id.into();
        paths::validate_project_id(&id)?;
        Ok(Self::new(id, name, owner_id))
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.touch();
    }

    pub fn set_status(&mut self, status: ProjectStatus) {
        self.status = status;
        self.touch();
    }

    pub fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
        self.touch();
    }

    /// Returns false when the tag was already present.
    pub fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.tags.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        self.touch();
        true
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        let removed = self.tags.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    pub fn is_finished(&self) -> bool {
        self.status == ProjectStatus::Completed
    }

    /// Close the open history entry and, when `next` is given, open a new one.
    pub(crate) fn record_transition(
        &mut self,
        outcome: StageOutcome,
        score: Option<u32>,
        next: Option<Stage>,
    ) {
        let now = Utc::now();
        if let Some(last) = self.stage_history.last_mut() {
            if last.exited.is_none() {
                last.exited = Some(now);
                last.outcome = Some(outcome);
                last.score = score;
            }
        }
        if let Some(stage) = next {
            self.current_stage = stage;
            self.stage_history.push(StageTransition {
                stage,
                entered: now,
                exited: None,
                outcome: None,
                score: None,
            });
        }
        self.updated_at = now;
    }

    /// Every stage before the current one has been completed or skipped;
    /// a completed project has finished them all.
    pub fn finished_stages(&self) -> &'static [Stage] {
        let all = Stage::all();
        if self.is_finished() {
            all
        } else {
            &all[..self.current_stage.index()]
        }
    }

    pub(crate) fn recompute_progress(&mut self) {
        let total = Stage::all().len() as u32;
        let done = self.finished_stages().len() as u32;
        self.progress_percentage = (done * 100 / total).min(100);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
