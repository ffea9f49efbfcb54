mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, plugins::PluginsSubcommand};
use devctl_core::sanitizer::{SanitizeMode, SANITIZE_MODE_VAR};
use devctl_core::DevctlError;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(
    name = "devctl",
    about = "Docker Compose development environments with project-defined commands",
    version,
    propagate_version = true
)]
struct Cli {
    /// Directory to discover project commands from (default: current directory)
    #[arg(long, global = true, env = "DEVCTL_CWD")]
    cwd: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Print the validated command instead of running it
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and validate command configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Show the detected project context
    Context,

    /// List installed plugins and the commands they bundle
    Plugins {
        #[command(subcommand)]
        subcommand: PluginsSubcommand,
    },

    /// Print version information
    Version,

    /// Run a command defined in project, plugin, or global configuration
    #[command(external_subcommand)]
    External(Vec<String>),
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let selection = SanitizeMode::from_env();
    if let Some(raw) = &selection.unrecognized {
        eprintln!(
            "warning: unrecognized {SANITIZE_MODE_VAR} value '{raw}'; falling back to strict"
        );
    }

    let cwd = root::resolve_cwd(cli.cwd.as_deref());
    let session = cmd::Session::load(&cwd, selection.mode);

    let result = match cli.command {
        Commands::Config { subcommand } => cmd::config::run(&session, subcommand, cli.json),
        Commands::Context => cmd::context::run(&session, cli.json),
        Commands::Plugins { subcommand } => cmd::plugins::run(&session, subcommand, cli.json),
        Commands::Version => cmd::version::run(cli.json),
        Commands::External(args) => cmd::run::run(&session, &args, cli.dry_run, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        let code = match e.downcast_ref::<DevctlError>() {
            Some(DevctlError::Execution { code, .. }) => *code,
            _ => 1,
        };
        std::process::exit(code);
    }
}
