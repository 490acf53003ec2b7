//! The abcgate command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "abcgate",
    version,
    about = "Quality gate for ABC notation teaching material"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze every notation block in a document
    Analyze {
        /// Markdown document or bare .abc file
        file: PathBuf,

        /// Instrument to score for (default from config)
        #[arg(long)]
        instrument: Option<String>,

        /// Also list the scoring rules that fired
        #[arg(long)]
        explain: bool,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Gate documents for publication
    Gate {
        /// Documents or directories to gate
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Instrument to score for (default from config)
        #[arg(long)]
        instrument: Option<String>,

        /// Learning-value threshold (default from config)
        #[arg(long)]
        threshold: Option<f64>,

        /// Adapt the threshold to recent scores
        #[arg(long)]
        dynamic: bool,

        /// Earlier gate reports supplying recent scores for --dynamic
        #[arg(long)]
        history: Vec<PathBuf>,

        /// Write the gate report as JSON to this path
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Exit code 1 if any document is not approved
        #[arg(long)]
        fail_on_draft: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check notation syntax and required headers
    Validate {
        /// Markdown document or bare .abc file
        file: PathBuf,
    },

    /// Normalize the layout of ABC notation
    Format {
        /// Markdown document or bare .abc file
        file: PathBuf,

        /// Rewrite the file instead of printing
        #[arg(long)]
        in_place: bool,
    },

    /// Summarize learning-value trends across gate reports
    Trend {
        /// Gate report JSON files
        #[arg(required = true)]
        reports: Vec<PathBuf>,

        /// Pass threshold (default from config)
        #[arg(long)]
        threshold: Option<f64>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List known instrument profiles
    Instruments {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and an example lesson
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("abcgate=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            file,
            instrument,
            explain,
            format,
            config,
        } => commands::analyze::execute(file, instrument, explain, format, config),
        Commands::Gate {
            paths,
            instrument,
            threshold,
            dynamic,
            history,
            output,
            format,
            fail_on_draft,
            config,
        } => commands::gate::execute(commands::gate::GateArgs {
            paths,
            instrument,
            threshold,
            dynamic,
            history,
            output,
            format,
            fail_on_draft,
            config,
        }),
        Commands::Validate { file } => commands::validate::execute(file),
        Commands::Format { file, in_place } => commands::format::execute(file, in_place),
        Commands::Trend {
            reports,
            threshold,
            format,
            config,
        } => commands::trend::execute(reports, threshold, format, config),
        Commands::Instruments { config } => commands::instruments::execute(config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
