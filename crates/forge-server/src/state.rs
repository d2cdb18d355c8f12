use forge_core::config::{ForgeConfig, QualityConfig};
use forge_core::stages::playbook::CompiledPlaybook;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared state for all routes.
#[derive(Clone, Default)]
pub struct AppState {
    pub quality: Arc<QualityConfig>,
    /// When set, every `/api/forge` request must carry this bearer token.
    pub token: Option<Arc<str>>,
    /// Compiled playbooks keyed by project id, kept for export.
    pub playbooks: Arc<RwLock<HashMap<String, CompiledPlaybook>>>,
}

impl AppState {
    pub fn new(quality: QualityConfig) -> Self {
        Self {
            quality: Arc::new(quality),
            ..Default::default()
        }
    }

    pub fn from_config(cfg: &ForgeConfig) -> Self {
        let mut state = Self::new(cfg.quality.clone());
        state.token = cfg.api.token.as_deref().map(Arc::from);
        state
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(Arc::from(token.into()));
        self
    }
}
