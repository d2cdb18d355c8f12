use super::{block_on, load_config, load_orchestrator, save_orchestrator, Session};
use crate::output::print_json;
use anyhow::{bail, Context};
use forge_client::{Endpoint, Method};
use std::path::Path;

pub fn run(
    root: &Path,
    id: &str,
    action: &str,
    model: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let endpoint: Endpoint = action.parse()?;
    if endpoint.method() != Method::Post {
        bail!("'{endpoint}' is a download; use `sutra export {id}`");
    }
    let Some(stage) = endpoint.stage() else {
        bail!("'{endpoint}' scores content; use `sutra assess {id}`");
    };

    let cfg = load_config(root)?;
    let mut orch = load_orchestrator(root, id, &cfg)?;
    if orch.project().is_finished() {
        bail!("{id} has completed every stage");
    }
    let current = orch.current_stage();
    if stage != current {
        bail!("'{endpoint}' belongs to {stage}, but {id} is at {current}");
    }

    let session = Session::open(root, &cfg)?;
    let client = session.client(&cfg)?;
    let mut request = client
        .request(id, stage, orch.context().to_request_context()?)
        .with_priority(orch.project().priority);
    if model.is_some() {
        request.model = model;
    }
    let result = block_on(client.generate(endpoint, &request))?;
    session.save(root)?;
    let response = result.with_context(|| format!("{endpoint} failed"))?;

    let missing = orch
        .update_draft(stage, response.content.clone())
        .with_context(|| format!("{endpoint} returned content that does not fit {stage}"))?
        .missing_required();
    save_orchestrator(root, orch)?;

    if json {
        print_json(&response)?;
        return Ok(());
    }

    let keys: Vec<&str> = response
        .content
        .as_object()
        .map(|o| o.keys().map(String::as_str).collect())
        .unwrap_or_default();
    println!("{endpoint}: merged {} into the {stage} draft", keys.join(", "));
    if let Some(qa) = &response.quality_assessment {
        println!(
            "Quality:  {} ({}), minimum {}",
            qa.overall_score, qa.quality_gate_status, qa.thresholds.minimum
        );
    }
    if let Some(cost) = &response.cost_tracking {
        println!("Tokens:   {}", cost.tokens_used);
    }
    if missing.is_empty() {
        println!("Ready:    sutra stage complete {id}");
    } else {
        println!("Missing:  {}", missing.join(", "));
    }
    Ok(())
}
