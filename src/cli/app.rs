//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use super::{keys, path, query};
use crate::storage::{Config, Project};

#[derive(Parser)]
#[command(name = "questline")]
#[command(author, version, about = "Dependency graph and progression engine for quest trackers")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project directory (defaults to searching upwards from the current directory)
    #[arg(long, short = 'C', global = true, env = "QUESTLINE_PROJECT")]
    pub project: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new questline project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Show progression overview
    Status,

    /// Show tasks grouped by dependency level
    Levels,

    /// Show tasks whose prerequisites are all completed
    Available,

    /// Show tasks waiting on prerequisites
    Blocked,

    /// Show objective keys and progress for a task
    Keys {
        /// Task ID
        task: String,
    },

    /// Resolve the storyline route to a node (lists endings when omitted)
    Path {
        /// Target node ID
        target: Option<String>,
    },

    /// Report dangling prerequisites and prerequisite cycles
    Check,
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let format = match cli.format {
        Some(format) => format,
        None => Config::load_global()?.default_format.into(),
    };
    let output = Output::new(format, cli.verbose);

    output.verbose("Questline CLI starting");

    if let Commands::Init { path } = &cli.command {
        output.verbose_ctx("init", &format!("Initializing project at: {}", path.display()));
        let project = Project::init(path)?;
        output.verbose_ctx(
            "init",
            &format!("Created .questline directory at: {}", project.data_dir().display()),
        );
        output.success(&format!("Initialized questline project at {}", project.root().display()));
        return Ok(());
    }

    let project = Project::open_or_discover(cli.project.as_deref())?;
    output.verbose(&format!("Opened project at: {}", project.root().display()));

    match cli.command {
        Commands::Init { .. } => {}
        Commands::Status => query::status(&project, &output)?,
        Commands::Levels => query::levels(&project, &output)?,
        Commands::Available => query::available(&project, &output)?,
        Commands::Blocked => query::blocked(&project, &output)?,
        Commands::Keys { task } => keys::run(&project, &output, &task)?,
        Commands::Path { target } => path::run(&project, &output, target.as_deref())?,
        Commands::Check => query::check(&project, &output)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}

/// Sends engine events to stderr; `RUST_LOG` overrides the default level
fn init_tracing(verbose: bool) {
    let default = if verbose { "questline=debug" } else { "questline=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
