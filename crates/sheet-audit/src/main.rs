//! CLI entry point for the spreadsheet audit.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sheet_audit::{AuditConfig, Auditor, BatchSummary, FileStatus};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Batch data-quality audit for spreadsheet files",
    long_about = "Checks every spreadsheet in a folder for missing values, duplicate values \
                  and non-numeric values, and writes one report workbook with a sheet per file.\n\n\
                  EXAMPLES:\n  \
                  # Check ID* columns for duplicates\n  \
                  sheet-audit scan data/ audit.xlsx ID\n\n  \
                  # Also require Score* columns to be numeric\n  \
                  sheet-audit scan data/ audit.xlsx ID Code --numeric-prefix Score\n\n  \
                  # Read everything from a JSON file\n  \
                  sheet-audit config settings.json"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Print the batch summary as JSON to stdout instead of logs
    ///
    /// Useful for piping to other tools: `... --json | jq .files`
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Audit a folder using command-line arguments
    Scan {
        /// Folder containing the spreadsheets to audit
        folder: PathBuf,

        /// Path of the report workbook to write
        output: PathBuf,

        /// Column-name prefixes checked for duplicate values
        #[arg(required = true)]
        prefixes: Vec<String>,

        /// Column-name prefix that must contain numeric data (repeatable)
        #[arg(long = "numeric-prefix", value_name = "PREFIX")]
        numeric_prefixes: Vec<String>,

        /// File extension to scan, without dot (repeatable, default: xlsx, xls)
        #[arg(long = "extension", value_name = "EXT")]
        extensions: Vec<String>,
    },

    /// Audit a folder using a JSON configuration file
    Config {
        /// Path of the configuration file
        #[arg(default_value = "config.json")]
        path: PathBuf,
    },
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let config = load_config(&args.command)?;
    info!(
        "Scanning {} for {}",
        config.folder_path.display(),
        config.extensions.join(", ")
    );

    let summary = Auditor::builder()
        .config(config)
        .build()
        .context("Invalid configuration")?
        .run()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if !args.quiet {
        print_human_readable_summary(&summary);
    }

    Ok(())
}

fn load_config(command: &Command) -> Result<AuditConfig> {
    match command {
        Command::Scan {
            folder,
            output,
            prefixes,
            numeric_prefixes,
            extensions,
        } => {
            let mut builder = AuditConfig::builder()
                .folder_path(folder)
                .output_excel_filename(output)
                .duplicate_prefixes(prefixes.iter().cloned())
                .numeric_prefixes(numeric_prefixes.iter().cloned());
            if !extensions.is_empty() {
                builder = builder.extensions(extensions.iter().cloned());
            }
            builder.build().context("Invalid arguments")
        }
        Command::Config { path } => AuditConfig::from_json_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
    }
}

/// Print a human-readable summary of the batch.
///
/// Uses `println!` rather than logging: this is the command's result and
/// shows regardless of log level.
fn print_human_readable_summary(summary: &BatchSummary) {
    println!();
    println!("{}", "=".repeat(80));
    println!("AUDIT COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!("Folder: {}", summary.folder.display());
    let Some(output) = &summary.output_file else {
        println!("No matching files found; no report written.");
        println!();
        return;
    };
    println!("Report: {}", output.display());
    println!(
        "Files:  {} audited, {} failed",
        summary.succeeded(),
        summary.failed()
    );
    println!();

    println!(
        "{:<32} {:<24} {:>8} {:>8} {:>10} {:>12}",
        "File", "Sheet", "Rows", "Nulls", "Duplicates", "Non-numeric"
    );
    println!("{}", "-".repeat(99));

    for file in &summary.files {
        match (file.status, &file.findings) {
            (FileStatus::Done, Some(findings)) => println!(
                "{:<32} {:<24} {:>8} {:>8} {:>10} {:>12}",
                truncate_str(&file.file_name, 31),
                file.sheet_name.as_deref().unwrap_or("-"),
                findings.rows,
                findings.rows_with_nulls,
                optional_count(findings.duplicate_rows),
                optional_count(findings.non_numeric_rows),
            ),
            _ => println!(
                "{:<32} FAILED: {}",
                truncate_str(&file.file_name, 31),
                file.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
    println!();
}

fn optional_count(count: Option<usize>) -> String {
    count.map_or_else(|| "-".to_string(), |n| n.to_string())
}

/// Truncate a string to a maximum number of characters, adding "..." if truncated.
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
