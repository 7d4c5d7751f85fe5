use anyhow::{Context, Result};
use clap::Parser;
use covshift::cli::{Cli, OutputFormat};
use covshift::csv_input::load_csv;
use covshift::{assess_dataset_shift, Dataset};
use regex::Regex;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn load(path: &Path) -> Result<Dataset> {
    load_csv(path).with_context(|| format!("Failed to load {}", path.display()))
}

/// Resolve the two samples from either two files or one file and a split
fn load_samples(args: &Cli) -> Result<(Dataset, Dataset)> {
    match (&args.reference, &args.current, &args.input) {
        (Some(reference), Some(current), None) => Ok((load(reference)?, load(current)?)),
        (None, None, Some(input)) => {
            let (Some(column), Some(threshold)) = (&args.split_column, args.split_threshold)
            else {
                anyhow::bail!("--input requires both --split-column and --split-threshold");
            };
            let table = load(input)?;
            let (reference, current) = table
                .split_at_threshold(column, threshold)
                .with_context(|| format!("Cannot split {} on {}", input.display(), column))?;
            tracing::debug!(
                "Split {} rows on {} <= {}: {} / {}",
                table.len(),
                column,
                threshold,
                reference.len(),
                current.len()
            );
            Ok((reference, current))
        }
        (_, _, Some(_)) => {
            anyhow::bail!("Cannot combine --input with --reference/--current. Choose one.");
        }
        _ => {
            anyhow::bail!(
                "Must specify either --reference and --current, or --input with a split.\n\
                 Usage: covshift -r A.csv -c B.csv\n\
                 \x20      covshift -i DATA.csv --split-column COL --split-threshold VALUE"
            );
        }
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let config = args.shift_config().context("Invalid detector configuration")?;
    let (mut reference, mut current) = load_samples(&args)?;

    if let Some(pattern) = &args.exclude_columns {
        let pattern = Regex::new(pattern)
            .with_context(|| format!("Invalid --exclude-columns regex: {}", pattern))?;
        reference = reference.exclude_matching(&pattern)?;
        current = current.exclude_matching(&pattern)?;
    }

    let assessment = assess_dataset_shift(&reference, &current, &config)?;

    match args.format {
        OutputFormat::Text => print!("{}", assessment.to_report_string()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&assessment)?),
    }

    Ok(())
}
