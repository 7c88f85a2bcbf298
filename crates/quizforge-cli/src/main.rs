//! quizforge CLI — deliver pages and evaluate responses from the command line.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "quizforge",
    version,
    about = "Assessment delivery and response evaluation"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble one page of an assessment for delivery
    Deliver {
        /// Path to a .json or .toml assessment document
        #[arg(long)]
        document: PathBuf,

        /// Requested page number (clamped to the document)
        #[arg(long, default_value = "1", allow_hyphen_values = true)]
        page: i64,

        /// Attempt number
        #[arg(long, default_value = "1")]
        attempt: u32,

        /// Delivery mode: delivery, review, preview
        #[arg(long, default_value = "delivery")]
        mode: String,

        /// Use deterministic ids instead of random ones
        #[arg(long)]
        sequential_ids: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Evaluate submitted responses for one question
    Evaluate {
        /// Path to a .json or .toml assessment document
        #[arg(long)]
        document: PathBuf,

        /// Question id as delivered (`<questionId>_<suffix>` is accepted)
        #[arg(long)]
        question: String,

        /// JSON file holding an array of {"input", "value"} objects
        #[arg(long)]
        responses: Option<PathBuf>,

        /// Inline response, repeatable (e.g. --response i1=b)
        #[arg(long = "response", value_name = "INPUT=VALUE")]
        inline: Vec<String>,

        /// Attempt number
        #[arg(long, default_value = "1")]
        attempt: u32,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check documents for authoring problems
    Validate {
        /// Path to a document file or a directory of documents
        #[arg(long)]
        document: PathBuf,
    },

    /// Summarize the pages, questions and parts of a document
    Inspect {
        /// Path to a .json or .toml assessment document
        #[arg(long)]
        document: PathBuf,
    },

    /// Create starter config and example assessment
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quizforge=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Deliver {
            document,
            page,
            attempt,
            mode,
            sequential_ids,
            config,
        } => commands::deliver::execute(document, page, attempt, mode, sequential_ids, config),
        Commands::Evaluate {
            document,
            question,
            responses,
            inline,
            attempt,
            config,
        } => commands::evaluate::execute(document, question, responses, inline, attempt, config),
        Commands::Validate { document } => commands::validate::execute(document),
        Commands::Inspect { document } => commands::inspect::execute(document),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
