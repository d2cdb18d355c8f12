use super::{
    block_on, load_config, load_orchestrator, parse_json_arg, parse_stage, save_orchestrator,
    Session,
};
use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use forge_core::{
    gate::GateDecision,
    orchestrator::{StageAdvance, StageCompletion},
    stages::StageData,
};
use std::path::Path;

#[derive(Subcommand)]
pub enum StageSubcommand {
    /// Show a stage payload and what it still needs
    Show {
        id: String,
        /// Stage to show (default: current stage)
        #[arg(long)]
        stage: Option<String>,
    },
    /// Merge a JSON patch into the current stage draft
    Draft {
        id: String,
        /// JSON object, or @file
        data: String,
    },
    /// Complete the current stage and advance if the quality gate allows it
    Complete {
        id: String,
        /// Quality score (default: ask the API to assess the draft)
        #[arg(long)]
        score: Option<u32>,
        /// JSON patch merged into the draft before completing, or @file
        #[arg(long)]
        data: Option<String>,
        /// Act with a lower role than the signed-in one
        #[arg(long)]
        role: Option<String>,
        /// Proceed below the minimum (expert and admin only)
        #[arg(long = "override")]
        override_gate: bool,
    },
    /// Skip the current stage when it is optional
    Skip { id: String },
    /// Return to an earlier stage, discarding later outputs
    Rollback {
        id: String,
        stage: String,
        /// Act with a lower role than the signed-in one
        #[arg(long)]
        role: Option<String>,
    },
}

pub fn run(root: &Path, subcmd: StageSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        StageSubcommand::Show { id, stage } => show(root, &id, stage.as_deref(), json),
        StageSubcommand::Draft { id, data } => draft(root, &id, &data, json),
        StageSubcommand::Complete {
            id,
            score,
            data,
            role,
            override_gate,
        } => complete(
            root,
            &id,
            score,
            data.as_deref(),
            role.as_deref(),
            override_gate,
            json,
        ),
        StageSubcommand::Skip { id } => skip(root, &id, json),
        StageSubcommand::Rollback { id, stage, role } => {
            rollback(root, &id, &stage, role.as_deref(), json)
        }
    }
}

fn show(root: &Path, id: &str, stage: Option<&str>, json: bool) -> anyhow::Result<()> {
    let cfg = load_config(root)?;
    let orch = load_orchestrator(root, id, &cfg)?;
    let stage = parse_stage(stage, orch.current_stage())?;
    let view = orch.view(stage);

    if json {
        print_json(&view)?;
        return Ok(());
    }

    println!("Stage:    {} ({})", view.label, view.stage);
    let state = if view.is_current {
        "current"
    } else if view.is_finished {
        "done"
    } else if view.is_accessible {
        "reopened"
    } else {
        "locked"
    };
    println!("State:    {state}");
    println!(
        "Gate:     minimum {}, recommended {}",
        view.thresholds.minimum, view.thresholds.recommended
    );
    if !view.thresholds.adjustments_applied.is_empty() {
        println!("Adjusted: {}", view.thresholds.adjustments_applied.join(", "));
    }
    if view.missing.is_empty() {
        println!("Missing:  (none)");
    } else {
        println!("Missing:  {}", view.missing.join(", "));
    }
    if let Some(data) = view.data {
        println!("\n{}", serde_json::to_string_pretty(&data.to_value()?)?);
    }
    Ok(())
}

fn draft(root: &Path, id: &str, data: &str, json: bool) -> anyhow::Result<()> {
    let cfg = load_config(root)?;
    let mut orch = load_orchestrator(root, id, &cfg)?;
    let stage = orch.current_stage();
    let patch = parse_json_arg(data)?;
    let missing = orch.update_draft(stage, patch)?.missing_required();

    if json {
        print_json(&serde_json::json!({ "stage": stage, "missing": missing }))?;
    } else if missing.is_empty() {
        println!("Draft for {stage} updated; all required fields present.");
    } else {
        println!("Draft for {stage} updated; missing: {}", missing.join(", "));
    }
    save_orchestrator(root, orch)
}

fn complete(
    root: &Path,
    id: &str,
    score: Option<u32>,
    data: Option<&str>,
    role: Option<&str>,
    override_gate: bool,
    json: bool,
) -> anyhow::Result<()> {
    let cfg = load_config(root)?;
    let session = Session::open(root, &cfg)?;
    let role = session.role(role)?;
    let mut orch = load_orchestrator(root, id, &cfg)?;
    let stage = orch.current_stage();

    if let Some(data) = data {
        orch.update_draft(stage, parse_json_arg(data)?)?;
    }
    let output = orch
        .context()
        .draft(stage)
        .cloned()
        .unwrap_or_else(|| StageData::empty(stage));

    let score = match score {
        Some(s) => s,
        None => {
            let client = session.client(&cfg)?;
            let request = client
                .request(id, stage, output.to_value()?)
                .with_priority(orch.project().priority);
            let qa = block_on(client.assess(&request))?.context("quality assessment failed")?;
            qa.overall_score
        }
    };

    let result = orch.complete_stage(StageCompletion {
        stage,
        output,
        score,
        role,
        override_requested: override_gate,
    });
    // The draft patch is kept even when the gate refuses the stage.
    save_orchestrator(root, orch)?;
    let advance = result?;

    if json {
        print_json(&advance)?;
    } else {
        print_advance(&advance);
    }
    Ok(())
}

fn print_advance(advance: &StageAdvance) {
    match &advance.decision {
        GateDecision::Overridden { score, minimum, by } => println!(
            "Gate overridden by {by}: score {score} is below minimum {minimum}."
        ),
        decision => println!(
            "Gate {}: score {} (minimum {}).",
            decision.outcome_label(),
            decision.score(),
            advance.thresholds.minimum
        ),
    }
    match advance.to {
        Some(next) => println!("Advanced {} -> {}", advance.from, next),
        None => println!("Workflow complete."),
    }
    println!("Progress: {}%", advance.progress_percentage);
}

fn skip(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let cfg = load_config(root)?;
    let mut orch = load_orchestrator(root, id, &cfg)?;
    let from = orch.current_stage();
    let to = orch.skip_stage(from)?;
    let progress = orch.project().progress_percentage;
    save_orchestrator(root, orch)?;

    if json {
        print_json(&serde_json::json!({ "skipped": from, "to": to, "progressPercentage": progress }))?;
    } else {
        println!("Skipped {from}; now at {to}.");
    }
    Ok(())
}

fn rollback(
    root: &Path,
    id: &str,
    stage: &str,
    role: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let cfg = load_config(root)?;
    let role = Session::open(root, &cfg)?.role(role)?;
    let mut orch = load_orchestrator(root, id, &cfg)?;
    let target = parse_stage(Some(stage), orch.current_stage())?;
    let from = orch.current_stage();
    let to = orch.rollback_to(target, role)?;
    let progress = orch.project().progress_percentage;
    save_orchestrator(root, orch)?;

    if json {
        print_json(&serde_json::json!({ "from": from, "to": to, "progressPercentage": progress }))?;
    } else {
        println!("Rolled back {from} -> {to}; later stage outputs were discarded.");
    }
    Ok(())
}
