use anyhow::{Context, Result};
use clap::Parser;
use frame_shell::debugger::{Console, Debugger, LineEditor, StdioConsole};
use frame_shell::dump::StackDump;
use frame_shell::eval::{JsonEvaluator, JsonInspector};
use frame_shell::ShellConfig;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Replay a captured call stack and break into a frame shell over it.
#[derive(Debug, Parser)]
#[command(name = "frame-shell", version)]
struct Cli {
    /// JSON stack dump to replay (frames innermost first)
    #[arg(long)]
    snapshot: PathBuf,

    /// Read shell commands from this file instead of the terminal
    #[arg(long)]
    script: Option<PathBuf>,

    /// TOML file with shell settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured prompt
    #[arg(long)]
    prompt: Option<String>,

    /// Render results as indented JSON
    #[arg(long)]
    pretty: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("FRAME_SHELL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ShellConfig::load(path)?,
        None => ShellConfig::default(),
    };
    if let Some(prompt) = cli.prompt {
        config.prompt = prompt;
    }

    let stack = StackDump::load(&cli.snapshot)?.into_shadow_stack();
    tracing::info!(frames = stack.depth(), path = %cli.snapshot.display(), "loaded stack dump");

    let console: Box<dyn Console> = match &cli.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("could not open script {}", path.display()))?;
            Box::new(StdioConsole::new(BufReader::new(file), io::stdout()).echo(true))
        }
        None => Box::new(LineEditor::new(config.history)?),
    };

    let inspector = if cli.pretty {
        JsonInspector::pretty()
    } else {
        JsonInspector::new()
    };

    let debugger = Debugger::new(&stack, JsonEvaluator::new(), inspector, console).with_config(config);
    debugger.break_here()?;

    println!("resumed");
    Ok(())
}
