use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use forge_core::{
    config::{ForgeConfig, WarnLevel},
    gate,
    types::{Priority, Stage},
};
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the effective configuration, environment overrides included
    Show,
    /// Validate the config for common mistakes
    Validate,
}

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    let config = ForgeConfig::load_with_env(root).context("failed to load config")?;
    match subcmd {
        ConfigSubcommand::Show => show(&config, json),
        ConfigSubcommand::Validate => validate(&config, json),
    }
}

fn show(config: &ForgeConfig, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(config);
    }

    println!("Workspace:   {}", config.project.name);
    println!("Environment: {}", config.environment);
    println!("API:         {}", config.api.base_url);
    println!("Model:       {}", config.api.default_model);
    println!("Timeout:     {}s", config.api.timeout_seconds);
    println!(
        "Auth:        {}",
        if config.api.token.is_some() {
            "bearer token"
        } else {
            "guest"
        }
    );
    println!("Guest limit: {}/day", config.guest_daily_limit);
    println!(
        "Workflow:    ux skip {}, rollback {}",
        if config.workflow.allow_ux_skip { "on" } else { "off" },
        if config.workflow.allow_rollback { "on" } else { "off" },
    );
    println!();

    let rows = Stage::all()
        .iter()
        .map(|&stage| {
            let t = gate::thresholds_for(stage, &config.quality, Priority::Medium);
            vec![
                stage.to_string(),
                t.minimum.to_string(),
                t.recommended.to_string(),
            ]
        })
        .collect();
    print_table(&["STAGE", "MINIMUM", "RECOMMENDED"], rows);
    Ok(())
}

fn validate(config: &ForgeConfig, json: bool) -> anyhow::Result<()> {
    let warnings = config.validate();

    if json {
        print_json(&serde_json::json!({ "warnings": warnings }))?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}
