//! Local project cache under `.sutra/projects/<id>/manifest.yaml`.
//!
//! A record is the orchestrator snapshot: the project plus its stage
//! context. The server stays the source of truth; this lets the CLI
//! resume a project between invocations.

use crate::error::{ForgeError, Result};
use crate::orchestrator::{OrchestratorConfig, StageContext, StageOrchestrator};
use crate::paths;
use crate::project::ForgeProject;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub project: ForgeProject,
    #[serde(default)]
    pub context: StageContext,
}

impl ProjectRecord {
    pub fn new(project: ForgeProject) -> Self {
        Self {
            project,
            context: StageContext::default(),
        }
    }

    pub fn create(
        root: &Path,
        id: impl Into<String>,
        name: impl Into<String>,
        owner_id: impl Into<String>,
    ) -> Result<Self> {
        let project = ForgeProject::create(id, name, owner_id)?;
        if Self::exists(root, &project.id) {
            return Err(ForgeError::ProjectExists(project.id));
        }
        let record = Self::new(project);
        record.save(root)?;
        Ok(record)
    }

    pub fn exists(root: &Path, id: &str) -> bool {
        paths::project_manifest(root, id).exists()
    }

    pub fn load(root: &Path, id: &str) -> Result<Self> {
        paths::validate_project_id(id)?;
        let manifest = paths::project_manifest(root, id);
        if !manifest.exists() {
            return Err(ForgeError::ProjectNotFound(id.to_string()));
        }
        let data = std::fs::read_to_string(&manifest)?;
        let record: ProjectRecord = serde_yaml::from_str(&data)?;
        Ok(record)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let manifest = paths::project_manifest(root, &self.project.id);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&manifest, data.as_bytes())
    }

    /// All cached projects, most recently updated first.
    pub fn list(root: &Path) -> Result<Vec<Self>> {
        let dir = paths::projects_dir(root);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let id = entry.file_name().to_string_lossy().into_owned();
            match Self::load(root, &id) {
                Ok(r) => records.push(r),
                Err(ForgeError::ProjectNotFound(_) | ForgeError::InvalidProjectId(_)) => {}
                Err(e) => return Err(e),
            }
        }
        records.sort_by(|a, b| b.project.updated_at.cmp(&a.project.updated_at));
        Ok(records)
    }

    pub fn into_orchestrator(self, config: OrchestratorConfig) -> StageOrchestrator {
        StageOrchestrator::from_parts(self.project, self.context, config)
    }

    pub fn from_orchestrator(orchestrator: StageOrchestrator) -> Self {
        let (project, context) = orchestrator.into_parts();
        Self { project, context }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::StageData;
    use crate::types::Stage;
    use tempfile::TempDir;

    #[test]
    fn create_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let created = ProjectRecord::create(dir.path(), "prompt-hub", "Prompt Hub", "u-1").unwrap();
        let loaded = ProjectRecord::load(dir.path(), "prompt-hub").unwrap();
        assert_eq!(loaded.project.id, created.project.id);
        assert_eq!(loaded.project.current_stage, Stage::IdeaRefinement);
    }

    #[test]
    fn create_rejects_duplicates_and_bad_ids() {
        let dir = TempDir::new().unwrap();
        ProjectRecord::create(dir.path(), "dup", "Dup", "u").unwrap();
        assert!(matches!(
            ProjectRecord::create(dir.path(), "dup", "Dup", "u"),
            Err(ForgeError::ProjectExists(_))
        ));
        assert!(matches!(
            ProjectRecord::create(dir.path(), "Not Valid", "x", "u"),
            Err(ForgeError::InvalidProjectId(_))
        ));
    }

    #[test]
    fn missing_project() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            ProjectRecord::load(dir.path(), "ghost"),
            Err(ForgeError::ProjectNotFound(_))
        ));
        assert!(ProjectRecord::list(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn context_survives_save() {
        let dir = TempDir::new().unwrap();
        let record = ProjectRecord::create(dir.path(), "ctx", "Ctx", "u").unwrap();
        let mut orch = record.into_orchestrator(OrchestratorConfig::default());
        orch.update_draft(
            Stage::IdeaRefinement,
            serde_json::json!({"problemStatement": "Prompts scatter across docs"}),
        )
        .unwrap();
        ProjectRecord::from_orchestrator(orch).save(dir.path()).unwrap();

        let loaded = ProjectRecord::load(dir.path(), "ctx").unwrap();
        match loaded.context.draft(Stage::IdeaRefinement) {
            Some(StageData::IdeaRefinement(idea)) => {
                assert_eq!(idea.problem_statement, "Prompts scatter across docs")
            }
            other => panic!("unexpected draft: {other:?}"),
        }
    }

    #[test]
    fn list_skips_stray_directories() {
        let dir = TempDir::new().unwrap();
        ProjectRecord::create(dir.path(), "one", "One", "u").unwrap();
        ProjectRecord::create(dir.path(), "two", "Two", "u").unwrap();
        std::fs::create_dir_all(paths::projects_dir(dir.path()).join("empty")).unwrap();
        let ids: Vec<String> = ProjectRecord::list(dir.path())
            .unwrap()
            .into_iter()
            .map(|r| r.project.id)
            .collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&"one".to_string()) && ids.contains(&"two".to_string()));
    }
}
