//! Splice devtools
//!
//! Inspect trees built from a source file and the JSON parse tree an
//! external parser produced for it.

mod commands;
mod report;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use splice_core::{ConfigLoader, Language, SyntaxKind};
use tracing::error;

#[derive(Parser)]
#[command(name = "splice-devtools")]
#[command(about = "Inspect and check splice syntax trees")]
#[command(version = splice_core::VERSION)]
#[command(
    long_about = "Builds splice trees from a source file plus the JSON parse tree of an\n\
external parser, then dumps them, checks them or queries edit positions.\n\
\n\
Examples:\n  \
splice-devtools dump app.py --tree app.json          # Indented tree dump\n  \
splice-devtools dump app.py --tree app.json --json   # DebugNode JSON\n  \
splice-devtools check app.py --tree app.json         # Round-trip and syntax check\n  \
splice-devtools lines app.py --tree app.json --kind statement_list"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        help = "Path to configuration file (splice.toml/.splice.toml/splice.json)"
    )]
    config: Option<PathBuf>,

    /// Verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Source file, its parse tree and its language
#[derive(clap::Args, Debug, Clone)]
struct Input {
    /// Source file
    source: PathBuf,

    /// JSON parse tree of the source
    #[arg(short, long)]
    tree: PathBuf,

    /// Language of the source (default: from the file extension)
    #[arg(short, long)]
    language: Option<Language>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tree and its comments
    Dump {
        #[command(flatten)]
        input: Input,

        /// Print serialized nodes instead of the indented dump
        #[arg(long)]
        json: bool,
    },

    /// Verify the round trip and report the syntax error, if any
    Check {
        #[command(flatten)]
        input: Input,
    },

    /// Print the available insertion lines of every list of a kind
    Lines {
        #[command(flatten)]
        input: Input,

        /// List kind, e.g. `statement_list`
        #[arg(short, long)]
        kind: SyntaxKind,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "splice=warn",
        1 => "splice=info",
        2 => "splice=debug",
        _ => "splice=trace",
    };
    splice_core::init_tracing_with(log_level);

    if let Err(e) = run_command(cli) {
        error!("splice-devtools failed: {e:#}");
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = ConfigLoader::load(cli.config.as_deref(), None)?;
    match cli.command {
        Commands::Dump { input, json } => commands::dump(&config, &input, json),
        Commands::Check { input } => commands::check(&config, &input),
        Commands::Lines { input, kind } => commands::lines(&config, &input, kind),
    }
}
