//! runhistory CLI - fold recorded run histories from the command line
//!
//! # Commands
//! - `runhistory fold <history.json>` - folded node collection keyed by group
//! - `runhistory timeline <history.json>` - nodes in render order
//! - `runhistory replay <history.json>` - node state after every event
//!
//! Pass `-` as the input to read the history from stdin.

mod fold;
mod observe;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use runhistory_core::{ParserConfig, RawHistoryEvent};

/// Run-history parser CLI
#[derive(Parser)]
#[command(name = "runhistory")]
#[command(author, version, about = "Fold durable function run histories into logical steps")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log folding decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct InputArgs {
    /// History JSON file (`-` for stdin)
    input: String,

    /// Parser config TOML file
    #[arg(short, long)]
    config: Option<String>,

    /// Compact single-line JSON output
    #[arg(long)]
    compact: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the folded node collection
    Fold(InputArgs),

    /// Print the nodes sorted for rendering
    Timeline(InputArgs),

    /// Print the touched node after each event
    Replay(InputArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    observe::init_stderr_tracing(cli.verbose);

    let (args, output) = match cli.command {
        Commands::Fold(args) => {
            let (events, config) = load(&args)?;
            let output = fold::fold(events, config).await?;
            (args, output)
        }
        Commands::Timeline(args) => {
            let (events, config) = load(&args)?;
            let output = fold::timeline(events, config)?;
            (args, output)
        }
        Commands::Replay(args) => {
            let (events, config) = load(&args)?;
            let output = fold::replay(events, config)?;
            (args, output)
        }
    };

    println!("{}", fold::render(&output, !args.compact)?);
    Ok(())
}

fn load(args: &InputArgs) -> Result<(Vec<RawHistoryEvent>, ParserConfig)> {
    let config = fold::load_config(args.config.as_deref())?;
    let events = fold::load_history(&args.input)?;
    tracing::info!(events = events.len(), input = %args.input, "loaded history");
    Ok((events, config))
}
