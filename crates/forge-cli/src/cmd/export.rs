use super::{block_on, load_config, load_orchestrator, Session};
use crate::output::print_json;
use anyhow::{bail, Context};
use forge_core::{io, paths, types::ExportFormat};
use std::path::Path;

pub fn run(
    root: &Path,
    id: &str,
    format: &str,
    out: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let format: ExportFormat = format.parse()?;
    let cfg = load_config(root)?;
    let orch = load_orchestrator(root, id, &cfg)?;
    if !orch.export_enabled() {
        bail!("export is disabled until the playbook is compiled: run `sutra generate {id} compile-playbook`");
    }

    let client = Session::open(root, &cfg)?.client(&cfg)?;
    let doc = block_on(client.export_playbook(id, format))?
        .with_context(|| format!("failed to export {id} as {format}"))?;

    let dir = out.map(Path::to_path_buf).unwrap_or_else(|| paths::exports_dir(root));
    io::ensure_dir(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = doc
        .save_in(&dir)
        .with_context(|| format!("failed to write {}", doc.filename))?;

    if json {
        print_json(&serde_json::json!({
            "path": path,
            "contentType": doc.content_type,
            "bytes": doc.bytes.len(),
        }))?;
    } else {
        println!("Exported {} ({} bytes)", path.display(), doc.bytes.len());
    }
    Ok(())
}
