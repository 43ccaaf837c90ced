mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "factura",
    version,
    about = "Field extraction tool for scanned Colombian invoices"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the canonical fields from a scanned invoice PDF
    Extract {
        /// Path to the invoice PDF
        document: PathBuf,

        /// Force a format instead of auto-detecting (e.g. "bbi", "latam")
        #[arg(short, long, value_name = "FORMAT")]
        format: Option<String>,

        /// Output format: table (default), json or csv
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write the fields to a CSV file instead of stdout
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// Fall back to structural layout scoring when keyword and
        /// probe detection both fail
        #[arg(long)]
        structural: bool,

        /// OCR language profile passed to tesseract
        #[arg(long, default_value = "spa")]
        lang: String,

        /// Per-page timeout in seconds for the external tools
        #[arg(long, value_name = "SECONDS")]
        timeout: Option<u64>,
    },
    /// Detect the invoice format without extracting fields
    Classify {
        /// Path to the invoice PDF
        document: PathBuf,

        /// Fall back to structural layout scoring when keyword and
        /// probe detection both fail
        #[arg(long)]
        structural: bool,

        /// OCR language profile passed to tesseract
        #[arg(long, default_value = "spa")]
        lang: String,

        /// Per-page timeout in seconds for the external tools
        #[arg(long, value_name = "SECONDS")]
        timeout: Option<u64>,
    },
    /// Extract every PDF in a directory, one CSV per invoice
    Batch {
        /// Directory containing invoice PDFs
        directory: PathBuf,

        /// Directory for the per-invoice CSV files (default: <directory>/extracted)
        #[arg(short = 'O', long = "out-dir", value_name = "DIR")]
        out_dir: Option<PathBuf>,

        /// Fall back to structural layout scoring when keyword and
        /// probe detection both fail
        #[arg(long)]
        structural: bool,

        /// OCR language profile passed to tesseract
        #[arg(long, default_value = "spa")]
        lang: String,

        /// Per-page timeout in seconds for the external tools
        #[arg(long, value_name = "SECONDS")]
        timeout: Option<u64>,
    },
    /// Inspect the supported invoice formats
    Formats {
        #[command(subcommand)]
        action: FormatsAction,
    },
}

#[derive(Subcommand)]
enum FormatsAction {
    /// List the supported formats with their required fields
    List,
    /// Print the canonical field names every format maps onto
    Fields,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract {
            document,
            format,
            output,
            out,
            structural,
            lang,
            timeout,
        } => commands::extract::run(document, format, &output, out, structural, &lang, timeout),
        Commands::Classify {
            document,
            structural,
            lang,
            timeout,
        } => commands::classify::run(document, structural, &lang, timeout),
        Commands::Batch {
            directory,
            out_dir,
            structural,
            lang,
            timeout,
        } => commands::batch::run(directory, out_dir, structural, &lang, timeout),
        Commands::Formats { action } => match action {
            FormatsAction::List => commands::formats::list(),
            FormatsAction::Fields => commands::formats::fields(),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
