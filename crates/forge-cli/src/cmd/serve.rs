use forge_core::{config::ForgeConfig, ForgeError};
use forge_server::AppState;
use std::path::Path;

pub fn run(root: &Path, port: u16) -> anyhow::Result<()> {
    let config = match ForgeConfig::load_with_env(root) {
        Ok(cfg) => cfg,
        Err(ForgeError::NotInitialized) => {
            tracing::info!("no .sutra/config.yaml; serving with default thresholds");
            let mut cfg = ForgeConfig::new("forge");
            cfg.apply_env(|key| std::env::var(key).ok())?;
            cfg
        }
        Err(e) => return Err(anyhow::Error::new(e).context("failed to load config")),
    };

    let state = AppState::from_config(&config);
    if state.token.is_some() {
        tracing::info!("bearer token required on /api/forge routes");
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(forge_server::serve(state, port))
}
