use super::{block_on, load_config, load_orchestrator, parse_stage, Session};
use crate::output::{print_json, print_table};
use anyhow::Context;
use std::path::Path;

pub fn run(root: &Path, id: &str, stage: Option<&str>, json: bool) -> anyhow::Result<()> {
    let cfg = load_config(root)?;
    let orch = load_orchestrator(root, id, &cfg)?;
    let stage = parse_stage(stage, orch.current_stage())?;
    let payload = match orch.context().get(stage) {
        Some(data) => data.to_value()?,
        None => serde_json::json!({}),
    };

    let client = Session::open(root, &cfg)?.client(&cfg)?;
    let request = client
        .request(id, stage, payload)
        .with_priority(orch.project().priority);
    let qa = block_on(client.assess(&request))?
        .with_context(|| format!("failed to assess {stage}"))?;

    if json {
        print_json(&qa)?;
        return Ok(());
    }

    println!(
        "{}: {} ({}), confidence {:.0}%",
        stage.label(),
        qa.overall_score,
        qa.quality_gate_status,
        qa.confidence_level * 100.0
    );
    println!(
        "Gate: minimum {}, recommended {}",
        qa.thresholds.minimum, qa.thresholds.recommended
    );
    let rows = qa
        .dimension_scores
        .iter()
        .map(|(name, score)| vec![name.clone(), score.to_string()])
        .collect();
    print_table(&["DIMENSION", "SCORE"], rows);

    let failing = qa.failing_dimensions();
    if !failing.is_empty() {
        println!("\nBelow minimum: {}", failing.join(", "));
    }
    Ok(())
}
