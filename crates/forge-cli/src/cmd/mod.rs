pub mod assess;
pub mod config;
pub mod export;
pub mod gate;
pub mod generate;
pub mod init;
pub mod project;
pub mod serve;
pub mod stage;

use anyhow::Context;
use forge_client::{ClientConfig, ForgeClient};
use forge_core::auth::{AuthProvider, AuthUser, GuestAuth, GuestUsage, StaticTokenAuth};
use forge_core::config::ForgeConfig;
use forge_core::orchestrator::{OrchestratorConfig, StageOrchestrator};
use forge_core::types::{Stage, UserRole};
use forge_core::workspace::ProjectRecord;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

pub(crate) fn load_config(root: &Path) -> anyhow::Result<ForgeConfig> {
    let cfg = ForgeConfig::load_with_env(root).context("failed to load config")?;
    for w in cfg.validate() {
        tracing::warn!(level = ?w.level, "{}", w.message);
    }
    Ok(cfg)
}

pub(crate) fn load_orchestrator(
    root: &Path,
    id: &str,
    cfg: &ForgeConfig,
) -> anyhow::Result<StageOrchestrator> {
    let record =
        ProjectRecord::load(root, id).with_context(|| format!("failed to load project '{id}'"))?;
    Ok(record.into_orchestrator(OrchestratorConfig::from(cfg)))
}

pub(crate) fn save_orchestrator(root: &Path, orch: StageOrchestrator) -> anyhow::Result<()> {
    let id = orch.project().id.clone();
    ProjectRecord::from_orchestrator(orch)
        .save(root)
        .with_context(|| format!("failed to save project '{id}'"))
}

pub(crate) fn parse_stage(value: Option<&str>, current: Stage) -> anyhow::Result<Stage> {
    match value {
        Some(s) => s.parse().with_context(|| format!("unknown stage '{s}'")),
        None => Ok(current),
    }
}

fn parse_role(value: &str) -> anyhow::Result<UserRole> {
    value
        .parse()
        .with_context(|| format!("unknown role '{value}' (guest, user, expert, admin)"))
}

/// Literal JSON, or `@path` to read JSON from a file.
pub(crate) fn parse_json_arg(value: &str) -> anyhow::Result<serde_json::Value> {
    let text = match value.strip_prefix('@') {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?
        }
        None => value.to_string(),
    };
    serde_json::from_str(&text).context("payload is not valid JSON")
}

/// Auth for one invocation: a bearer session when a token is configured,
/// guest otherwise. Guest usage is read from and written back to
/// `.sutra/guest-usage.yaml` so the daily allowance spans invocations.
pub(crate) struct Session {
    auth: Arc<dyn AuthProvider>,
    guest: Option<Arc<GuestAuth>>,
}

impl Session {
    pub(crate) fn open(root: &Path, cfg: &ForgeConfig) -> anyhow::Result<Self> {
        match &cfg.api.token {
            Some(token) => {
                let user = AuthUser {
                    id: cfg
                        .project
                        .owner
                        .clone()
                        .unwrap_or_else(|| "cli".to_string()),
                    name: cfg.project.owner.clone().unwrap_or_default(),
                    email: None,
                    role: cfg.api.role,
                };
                Ok(Self {
                    auth: Arc::new(StaticTokenAuth::with_token(token.clone(), user)),
                    guest: None,
                })
            }
            None => {
                let usage = GuestUsage::load(root).context("failed to read guest usage")?;
                let guest = Arc::new(GuestAuth::with_usage(cfg.guest_daily_limit, usage));
                let auth: Arc<dyn AuthProvider> = guest.clone();
                Ok(Self {
                    auth,
                    guest: Some(guest),
                })
            }
        }
    }

    /// Role to act as: `--role` when given, capped at the session's role.
    pub(crate) fn role(&self, requested: Option<&str>) -> anyhow::Result<UserRole> {
        let requested = requested.map(parse_role).transpose()?;
        Ok(self.auth.act_as(requested)?)
    }

    pub(crate) fn client(&self, cfg: &ForgeConfig) -> anyhow::Result<ForgeClient> {
        ForgeClient::new(ClientConfig::from(&cfg.api), self.auth.clone())
            .context("failed to build API client")
    }

    /// Persist guest usage. No-op for token sessions.
    pub(crate) fn save(&self, root: &Path) -> anyhow::Result<()> {
        if let Some(guest) = &self.guest {
            guest
                .usage()
                .save(root)
                .context("failed to record guest usage")?;
        }
        Ok(())
    }
}

/// Run a future to completion on a fresh runtime.
pub(crate) fn block_on<F: Future>(fut: F) -> anyhow::Result<F::Output> {
    let rt = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    Ok(rt.block_on(fut))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_defaults_to_current() {
        assert_eq!(
            parse_stage(None, Stage::UxRequirements).unwrap(),
            Stage::UxRequirements
        );
        assert_eq!(
            parse_stage(Some("technical_analysis"), Stage::IdeaRefinement).unwrap(),
            Stage::TechnicalAnalysis
        );
        assert!(parse_stage(Some("nope"), Stage::IdeaRefinement).is_err());
    }

    #[test]
    fn json_arg_reads_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("idea.json");
        std::fs::write(&path, r#"{"problemStatement": "x"}"#).unwrap();
        let v = parse_json_arg(&format!("@{}", path.display())).unwrap();
        assert_eq!(v["problemStatement"], "x");
        assert!(parse_json_arg("{not json").is_err());
    }

    #[test]
    fn guest_without_token() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut cfg = ForgeConfig::new("w");
        let guest = Session::open(dir.path(), &cfg).unwrap();
        assert!(!guest.auth.is_authenticated());
        assert_eq!(guest.role(None).unwrap(), UserRole::Guest);
        assert!(guest.role(Some("admin")).is_err());

        cfg.api.token = Some("t".to_string());
        cfg.api.role = UserRole::Expert;
        let session = Session::open(dir.path(), &cfg).unwrap();
        assert_eq!(session.auth.access_token().as_deref(), Some("t"));
        assert_eq!(session.role(None).unwrap(), UserRole::Expert);
        assert_eq!(session.role(Some("user")).unwrap(), UserRole::User);
        assert!(session.role(Some("admin")).is_err());
        assert!(session.role(Some("wizard")).is_err());
    }
}
