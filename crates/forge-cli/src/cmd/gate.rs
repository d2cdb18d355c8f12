use super::{load_config, load_orchestrator, parse_stage, Session};
use crate::output::print_json;
use clap::Subcommand;
use forge_core::{
    gate::{GateHandler, QualityGate},
    quality::GateStatus,
    types::UserRole,
};
use std::path::Path;

#[derive(Subcommand)]
pub enum GateSubcommand {
    /// Check a score against a stage's quality gate
    Check {
        id: String,
        #[arg(long)]
        score: u32,
        /// Stage to check (default: current stage)
        #[arg(long)]
        stage: Option<String>,
        /// Act with a lower role than the signed-in one
        #[arg(long)]
        role: Option<String>,
        /// Ask for an override below the minimum
        #[arg(long = "override")]
        override_gate: bool,
    },
}

pub fn run(root: &Path, subcmd: GateSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        GateSubcommand::Check {
            id,
            score,
            stage,
            role,
            override_gate,
        } => check(
            root,
            &id,
            score,
            stage.as_deref(),
            role.as_deref(),
            override_gate,
            json,
        ),
    }
}

/// Collects the gate callback as terminal lines.
#[derive(Default)]
struct ConsoleGate {
    lines: Vec<String>,
}

impl GateHandler for ConsoleGate {
    fn on_pass(&mut self, score: u32, status: GateStatus) {
        self.lines.push(format!("PASS  score {score} ({status})"));
    }

    fn on_block(&mut self, score: u32, minimum: u32) {
        self.lines
            .push(format!("BLOCK score {score} is below minimum {minimum}"));
    }

    fn on_override(&mut self, score: u32, minimum: u32, by: UserRole) {
        self.lines.push(format!(
            "OVERRIDE score {score} is below minimum {minimum}; progress allowed by {by}"
        ));
    }
}

fn check(
    root: &Path,
    id: &str,
    score: u32,
    stage: Option<&str>,
    role: Option<&str>,
    override_gate: bool,
    json: bool,
) -> anyhow::Result<()> {
    let cfg = load_config(root)?;
    let role = Session::open(root, &cfg)?.role(role)?;
    let orch = load_orchestrator(root, id, &cfg)?;
    let stage = parse_stage(stage, orch.current_stage())?;
    let thresholds = orch.thresholds(stage);

    let mut console = ConsoleGate::default();
    let decision = QualityGate::new(&thresholds).run(score, role, override_gate, &mut console);

    if json {
        print_json(&serde_json::json!({
            "stage": stage,
            "thresholds": thresholds,
            "decision": decision,
            "style": decision.style(),
        }))?;
        return Ok(());
    }

    println!(
        "{}: minimum {}, recommended {}",
        stage.label(),
        thresholds.minimum,
        thresholds.recommended
    );
    for line in console.lines {
        println!("{line}");
    }
    println!("Display: {}", decision.style().label());
    Ok(())
}
