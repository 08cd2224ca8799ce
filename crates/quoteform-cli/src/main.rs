mod commands;
mod output;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "quoteform",
    version,
    about = "Extract selected line items from equipment quotes and manage form field data"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct ExtractArgs {
    /// Path to the quote PDF
    pdf_file: PathBuf,

    /// Extraction config (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Price at or above which an item is a main machine (overrides config)
    #[arg(long, value_name = "AMOUNT")]
    threshold: Option<Decimal>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the selected line items of a quote
    Items {
        #[command(flatten)]
        extract: ExtractArgs,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write the items to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Group the selected line items into machines and common items
    Machines {
        #[command(flatten)]
        extract: ExtractArgs,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Print the free text that follows an item in the quote
    Context {
        #[command(flatten)]
        extract: ExtractArgs,

        /// Text naming the item, e.g. its first description line
        #[arg(short, long)]
        trigger: String,
    },
    /// Show a field record as sections, subsections and fields
    Layout {
        /// Field order: JSON list of {key, path} or an xlsx workbook with a "Form" sheet
        #[arg(long, value_name = "FILE")]
        order: PathBuf,

        /// Generated form HTML whose order takes precedence
        #[arg(long, value_name = "FILE")]
        html: Option<PathBuf>,

        /// Field record (JSON object of key -> value)
        #[arg(long, value_name = "FILE")]
        record: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// List fields of the field order that a record does not have yet
    Catalogue {
        /// Field order: JSON list of {key, path} or an xlsx workbook with a "Form" sheet
        #[arg(long, value_name = "FILE")]
        order: PathBuf,

        /// Field record (JSON object of key -> value)
        #[arg(long, value_name = "FILE")]
        record: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Compare an original and an edited field record
    Diff {
        /// Original field record (JSON)
        #[arg(long, value_name = "FILE")]
        original: PathBuf,

        /// Edited field record (JSON)
        #[arg(long, value_name = "FILE")]
        edited: PathBuf,

        /// Emit modification rows for this template
        #[arg(long, value_name = "ID")]
        template_id: Option<i64>,

        /// Reason recorded with each modification
        #[arg(long, default_value = "")]
        reason: String,

        /// Author recorded with each modification
        #[arg(long, default_value = "")]
        author: String,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Items { extract, output, out } => commands::items::run(&extract, &output, out),
        Commands::Machines { extract, output } => commands::machines::run(&extract, &output),
        Commands::Context { extract, trigger } => commands::context::run(&extract, &trigger),
        Commands::Layout {
            order,
            html,
            record,
            output,
        } => commands::layout::run(&order, html.as_deref(), &record, &output),
        Commands::Catalogue { order, record, output } => commands::layout::catalogue(&order, &record, &output),
        Commands::Diff {
            original,
            edited,
            template_id,
            reason,
            author,
            output,
        } => commands::diff::run(&original, &edited, template_id, &reason, &author, &output),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
