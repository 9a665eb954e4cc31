//! examgate CLI — the admin-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "examgate", version, about = "Timed knowledge-assessment toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a question source into a publishable test JSON file
    Ingest {
        /// Question source: unstructured text, or a JSON array of rows
        #[arg(long)]
        input: PathBuf,

        /// Source format: text, rows (default: by file extension)
        #[arg(long)]
        format: Option<String>,

        /// Externally unique test id (e.g. "react-final-2024")
        #[arg(long)]
        id: String,

        /// Test title shown to students
        #[arg(long)]
        title: String,

        /// Output path (default: "<id>.json")
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Parse a question source and report counts and warnings
    Validate {
        /// Question source: unstructured text, or a JSON array of rows
        #[arg(long)]
        input: PathBuf,

        /// Source format: text, rows (default: by file extension)
        #[arg(long)]
        format: Option<String>,
    },

    /// Grade a submission's responses against a test
    Grade {
        /// Test JSON produced by `ingest`
        #[arg(long)]
        test: PathBuf,

        /// Responses JSON: {"name", "email", "responses": {"1": "..."}}
        #[arg(long)]
        submission: PathBuf,

        /// Similarity service base URL (overrides config)
        #[arg(long)]
        grader_url: Option<String>,

        /// Write the graded submission JSON here
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Render report rows for a test's submissions
    Report {
        /// Test JSON produced by `ingest`
        #[arg(long)]
        test: PathBuf,

        /// JSON array of graded submissions
        #[arg(long)]
        submissions: PathBuf,

        /// Show per-question marks instead of the answer sheet
        #[arg(long)]
        marks: bool,
    },

    /// Create a starter config and example question file
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("examgate=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Ingest {
            input,
            format,
            id,
            title,
            output,
        } => commands::ingest::execute(input, format, id, title, output),
        Commands::Validate { input, format } => commands::validate::execute(input, format),
        Commands::Grade {
            test,
            submission,
            grader_url,
            output,
            config,
        } => commands::grade::execute(test, submission, grader_url, output, config).await,
        Commands::Report {
            test,
            submissions,
            marks,
        } => commands::report::execute(test, submissions, marks),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
