mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    config::ConfigSubcommand, gate::GateSubcommand, project::ProjectSubcommand,
    stage::StageSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sutra",
    about = "Drive a Sutra Forge project from idea to implementation playbook",
    version,
    propagate_version = true
)]
struct Cli {
    /// Workspace root (default: auto-detect from .sutra/)
    #[arg(long, global = true, env = "SUTRA_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a .sutra workspace in the current directory
    Init {
        /// Workspace name (default: directory name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Create and inspect Forge projects
    Project {
        #[command(subcommand)]
        subcommand: ProjectSubcommand,
    },

    /// Work on the stages of a project
    Stage {
        #[command(subcommand)]
        subcommand: StageSubcommand,
    },

    /// Evaluate the quality gate without changing the project
    Gate {
        #[command(subcommand)]
        subcommand: GateSubcommand,
    },

    /// Call a generation route and merge the result into the stage draft
    Generate {
        /// Project id
        id: String,
        /// Forge action, e.g. analyze-idea or compile-playbook
        action: String,
        /// Model override for this call
        #[arg(long)]
        model: Option<String>,
    },

    /// Ask the API to score a stage payload
    Assess {
        /// Project id
        id: String,
        /// Stage to assess (default: current stage)
        #[arg(long)]
        stage: Option<String>,
    },

    /// Download the compiled implementation playbook
    Export {
        /// Project id
        id: String,
        /// json, markdown, pdf or zip
        #[arg(long, default_value = "markdown")]
        format: String,
        /// Output directory (default: .sutra/exports)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Inspect and validate .sutra/config.yaml
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Run the development Forge API server
    Serve {
        /// Port to listen on (0 = OS-assigned)
        #[arg(long, default_value = "8787")]
        port: u16,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init { name } => cmd::init::run(&root, name.as_deref()),
        Commands::Project { subcommand } => cmd::project::run(&root, subcommand, cli.json),
        Commands::Stage { subcommand } => cmd::stage::run(&root, subcommand, cli.json),
        Commands::Gate { subcommand } => cmd::gate::run(&root, subcommand, cli.json),
        Commands::Generate { id, action, model } => {
            cmd::generate::run(&root, &id, &action, model, cli.json)
        }
        Commands::Assess { id, stage } => cmd::assess::run(&root, &id, stage.as_deref(), cli.json),
        Commands::Export { id, format, out } => {
            cmd::export::run(&root, &id, &format, out.as_deref(), cli.json)
        }
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
        Commands::Serve { port } => cmd::serve::run(&root, port),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
