use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use prismerge_core::{
    Block, ComposeConfig, ComposeOutcome, ExtractMode, MergePolicy, MergeReporter, compose,
};

/// CLI-specific summary format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "prismerge", version)]
#[command(about = "Merge Prisma schema fragments and package schemas into one schema file")]
struct Cli {
    /// Directory of schema fragments (scanned non-recursively).
    #[arg(long, default_value = "prisma/fragments")]
    fragments: PathBuf,

    /// Directory of package schemas (scanned recursively, datasource and
    /// generator blocks stripped).
    #[arg(long, default_value = "packages")]
    packages: PathBuf,

    /// Path of the merged schema file.
    #[arg(long, default_value = "prisma/schema.prisma")]
    output: PathBuf,

    /// Rebuild even when the inputs are unchanged.
    #[arg(long)]
    force: bool,

    /// Match block delimiters by brace depth instead of stopping at the
    /// first closing brace.
    #[arg(long)]
    balanced: bool,

    /// Summary format (default: text).
    #[arg(long, default_value = "text")]
    format: CliOutputFormat,

    /// Enable debug-level logging.
    #[arg(long)]
    verbose: bool,
}

/// Reporter that prints merge diagnostics to the console as they occur.
/// Duplicates are informational, conflicts are highlighted; neither affects
/// the exit status.
#[derive(Default)]
struct ConsoleReporter {
    duplicates: Vec<String>,
    conflicts: Vec<String>,
}

impl MergeReporter for ConsoleReporter {
    fn duplicate(&mut self, existing: &Block, incoming: &Block) {
        let message = format!(
            "{} {} from {} already exists (first seen in {})",
            incoming.kind, incoming.name, incoming.source, existing.source
        );
        eprintln!("{} {message}", "duplicate:".yellow().bold());
        self.duplicates.push(message);
    }

    fn conflict(&mut self, existing: &Block, incoming: &Block) {
        let message = format!(
            "{} {} defined in both {} and {} with different bodies; keeping {}",
            incoming.kind, incoming.name, existing.source, incoming.source, existing.source
        );
        eprintln!("{} {message}", "conflict:".red().bold());
        self.conflicts.push(message);
    }

    fn info(&mut self, message: &str) {
        eprintln!("{}", message.dimmed());
    }
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli) {
        eprintln!("{} {err}", "error:".red().bold());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), prismerge_core::ComposeError> {
    let config = ComposeConfig {
        fragments_dir: cli.fragments,
        packages_dir: cli.packages,
        output_path: cli.output,
        force: cli.force,
        policy: MergePolicy::FirstWins,
        mode: if cli.balanced {
            ExtractMode::Balanced
        } else {
            ExtractMode::FirstClose
        },
    };

    let mut reporter = ConsoleReporter::default();
    let outcome = compose(&config, &mut reporter)?;

    match cli.format {
        CliOutputFormat::Text => print_text_summary(&outcome),
        CliOutputFormat::Json => print_json_summary(&outcome, &reporter),
    }
    Ok(())
}

fn print_text_summary(outcome: &ComposeOutcome) {
    if outcome.skipped {
        println!(
            "{} {} is up to date",
            "unchanged".green().bold(),
            outcome.output_path.display()
        );
        return;
    }

    let counts: Vec<String> = outcome
        .kind_counts
        .iter()
        .map(|&(kind, count)| {
            format!("{count} {kind}{}", if count == 1 { "" } else { "s" })
        })
        .collect();
    let breakdown = if counts.is_empty() {
        "no blocks".to_string()
    } else {
        counts.join(", ")
    };
    println!(
        "{} {} ({breakdown})",
        "wrote".green().bold(),
        outcome.output_path.display()
    );
}

fn print_json_summary(outcome: &ComposeOutcome, reporter: &ConsoleReporter) {
    let counts: serde_json::Map<String, serde_json::Value> = outcome
        .kind_counts
        .iter()
        .map(|&(kind, count)| (kind.to_string(), serde_json::Value::from(count)))
        .collect();
    let summary = serde_json::json!({
        "skipped": outcome.skipped,
        "output": outcome.output_path,
        "fingerprint": outcome.fingerprint,
        "counts": counts,
        "duplicates": reporter.duplicates,
        "conflicts": reporter.conflicts,
    });
    println!("{summary:#}");
}
