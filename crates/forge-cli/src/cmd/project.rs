use super::{load_config, load_orchestrator};
use crate::output::{flag, print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use forge_core::{
    orchestrator::OrchestratorConfig,
    paths,
    types::{Priority, ProjectStatus, Stage},
    workspace::ProjectRecord,
};
use std::path::Path;

#[derive(Subcommand)]
pub enum ProjectSubcommand {
    /// Create a new project at the idea refinement stage
    Create {
        name: String,
        /// Project id (default: slug of the name)
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// low, medium, high or critical
        #[arg(long, default_value = "medium")]
        priority: String,
        /// Owner id recorded on the project
        #[arg(long)]
        owner: Option<String>,
    },
    /// List cached projects, most recently updated first
    List,
    /// Show project details and stage progress
    Show { id: String },
    /// Set the lifecycle status (draft, active, on_hold, completed, archived, cancelled)
    Status { id: String, status: String },
    /// Set the priority, which shifts quality thresholds
    Priority { id: String, priority: String },
    /// Add or remove a tag
    Tag {
        id: String,
        tag: String,
        #[arg(long)]
        remove: bool,
    },
}

pub fn run(root: &Path, subcmd: ProjectSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ProjectSubcommand::Create {
            name,
            id,
            description,
            priority,
            owner,
        } => create(root, &name, id, description, &priority, owner, json),
        ProjectSubcommand::List => list(root, json),
        ProjectSubcommand::Show { id } => show(root, &id, json),
        ProjectSubcommand::Status { id, status } => set_status(root, &id, &status, json),
        ProjectSubcommand::Priority { id, priority } => set_priority(root, &id, &priority, json),
        ProjectSubcommand::Tag {
            id,
            tag: name,
            remove,
        } => tag(root, &id, &name, remove, json),
    }
}

fn create(
    root: &Path,
    name: &str,
    id: Option<String>,
    description: Option<String>,
    priority: &str,
    owner: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let cfg = load_config(root)?;
    let priority: Priority = priority.parse()?;
    let id = id.unwrap_or_else(|| default_id(name));
    let owner = owner
        .or_else(|| cfg.project.owner.clone())
        .unwrap_or_else(|| "local".to_string());

    let mut record = ProjectRecord::create(root, &id, name, owner)
        .with_context(|| format!("failed to create project '{id}'"))?;
    if let Some(desc) = description {
        record.project.set_description(desc);
    }
    record.project.set_priority(priority);
    record.save(root).context("failed to save project")?;

    if json {
        print_json(&record.project)?;
    } else {
        println!("Created project: {id} ({name})");
        println!("Stage: {}", record.project.current_stage.label());
        println!("Next: sutra generate {id} analyze-idea");
    }
    Ok(())
}

/// Slug of the name, or a random id when the name has no usable characters.
fn default_id(name: &str) -> String {
    let slug = paths::slugify(name);
    if slug.is_empty() {
        let short: String = uuid::Uuid::new_v4().simple().to_string().chars().take(8).collect();
        format!("project-{short}")
    } else {
        slug
    }
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let records = ProjectRecord::list(root).context("failed to list projects")?;

    if json {
        let projects: Vec<_> = records.iter().map(|r| &r.project).collect();
        print_json(&projects)?;
        return Ok(());
    }

    if records.is_empty() {
        println!("No projects yet.");
        return Ok(());
    }

    let rows = records
        .iter()
        .map(|r| {
            let p = &r.project;
            vec![
                p.id.clone(),
                p.current_stage.to_string(),
                p.status.to_string(),
                p.priority.to_string(),
                format!("{}%", p.progress_percentage),
                p.name.clone(),
            ]
        })
        .collect();
    print_table(
        &["ID", "STAGE", "STATUS", "PRIORITY", "PROGRESS", "NAME"],
        rows,
    );
    Ok(())
}

fn show(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let cfg = load_config(root)?;
    let orch = load_orchestrator(root, id, &cfg)?;
    let project = orch.project();
    let views: Vec<_> = Stage::all().iter().map(|&s| orch.view(s)).collect();

    if json {
        print_json(&serde_json::json!({
            "project": project,
            "stages": views,
            "exportEnabled": orch.export_enabled(),
        }))?;
        return Ok(());
    }

    println!("Project:  {} ({})", project.id, project.name);
    if !project.description.is_empty() {
        println!("Desc:     {}", project.description);
    }
    println!("Status:   {}", project.status);
    println!("Priority: {}", project.priority);
    println!("Progress: {}%", project.progress_percentage);
    if !project.tags.is_empty() {
        println!("Tags:     {}", project.tags.join(", "));
    }
    println!("Updated:  {}", project.updated_at.format("%Y-%m-%d %H:%M"));
    println!();

    let rows = views
        .iter()
        .map(|v| {
            let state = if v.is_current {
                "current"
            } else if v.is_finished {
                "done"
            } else {
                "locked"
            };
            vec![
                v.stage.label().to_string(),
                state.to_string(),
                v.thresholds.minimum.to_string(),
                flag(v.data.is_some()),
                v.missing.join(", "),
            ]
        })
        .collect();
    print_table(&["STAGE", "STATE", "MIN", "DATA", "MISSING"], rows);

    if !project.stage_history.is_empty() {
        println!("\nHistory:");
        for t in &project.stage_history {
            let outcome = t
                .outcome
                .map(|o| o.to_string())
                .unwrap_or_else(|| "in progress".to_string());
            let score = t.score.map(|s| format!(" ({s})")).unwrap_or_default();
            println!(
                "  {}  {:<24} {outcome}{score}",
                t.entered.format("%Y-%m-%d %H:%M"),
                t.stage.to_string()
            );
        }
    }
    Ok(())
}

fn set_status(root: &Path, id: &str, status: &str, json: bool) -> anyhow::Result<()> {
    let status: ProjectStatus = status.parse()?;
    let mut record = ProjectRecord::load(root, id)?;
    record.project.set_status(status);
    record.save(root)?;
    report(&record, json, &format!("Status of {id} set to {status}"))
}

fn set_priority(root: &Path, id: &str, priority: &str, json: bool) -> anyhow::Result<()> {
    let cfg = load_config(root)?;
    let priority: Priority = priority.parse()?;
    let mut record = ProjectRecord::load(root, id)?;
    record.project.set_priority(priority);
    record.save(root)?;

    let orch = record
        .clone()
        .into_orchestrator(OrchestratorConfig::from(&cfg));
    let t = orch.thresholds(orch.current_stage());
    report(
        &record,
        json,
        &format!(
            "Priority of {id} set to {priority}; current stage minimum is now {}",
            t.minimum
        ),
    )
}

fn tag(root: &Path, id: &str, tag: &str, remove: bool, json: bool) -> anyhow::Result<()> {
    let mut record = ProjectRecord::load(root, id)?;
    let changed = if remove {
        record.project.remove_tag(tag)
    } else {
        record.project.add_tag(tag)
    };
    if changed {
        record.save(root)?;
    }
    let verb = match (remove, changed) {
        (false, true) => "Tagged",
        (true, true) => "Untagged",
        _ => "Unchanged",
    };
    report(&record, json, &format!("{verb} {id}: {tag}"))
}

fn report(record: &ProjectRecord, json: bool, message: &str) -> anyhow::Result<()> {
    if json {
        print_json(&record.project)
    } else {
        println!("{message}");
        Ok(())
    }
}
