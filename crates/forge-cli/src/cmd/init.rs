use anyhow::Context;
use forge_core::{config::ForgeConfig, io, paths};
use std::path::Path;

pub fn run(root: &Path, name: Option<&str>) -> anyhow::Result<()> {
    let workspace_name = name.map(str::to_string).unwrap_or_else(|| {
        root.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "forge".to_string())
    });

    println!("Initializing Sutra Forge in: {}", root.display());

    for dir in [paths::SUTRA_DIR, paths::PROJECTS_DIR, paths::EXPORTS_DIR] {
        let p = root.join(dir);
        io::ensure_dir(&p).with_context(|| format!("failed to create {}", p.display()))?;
    }

    let yaml = ForgeConfig::new(&workspace_name)
        .to_yaml()
        .context("failed to serialize config")?;
    let created = io::write_if_missing(&paths::config_path(root), yaml.as_bytes())
        .context("failed to write config.yaml")?;
    if created {
        println!("  created: {}", paths::CONFIG_FILE);
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
    }

    println!("\nNext: sutra project create \"<name>\"");
    Ok(())
}
