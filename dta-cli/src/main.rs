//! DTA header decoder CLI application.
//!
//! Decodes the header record of a DTA logger capture and lists its channels.

use anyhow::{Context, Result};
use clap::Parser;
use dta_core::{output, Columns, DecodeOptions, HeaderDecoder};
use env_logger::Env;
use log::LevelFilter;
use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

/// DTA datalogger header decoder.
///
/// Reads the tagged header at the start of a DTA capture and lists the
/// analogue and digital channels it declares.
#[derive(Parser, Debug)]
#[command(name = "dta-decode")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input file containing a header record, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file path (.csv)
    ///
    /// When omitted the channel listing is written to stdout.
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Columns of the channel listing.
    ///
    /// Format: comma-separated column names
    /// (kind, category, name, color, factor, direction, group)
    ///
    /// Examples:
    /// - "kind,category,name,color,factor" (default)
    /// - "name,direction,group"
    #[arg(short, long, default_value = "kind,category,name,color,factor")]
    columns: String,

    /// Keep per-item direction, visibility and support-only bits on digital
    /// channels
    #[arg(short, long)]
    digital_attributes: bool,

    /// Suppress the summary on stderr
    #[arg(short, long)]
    quiet: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut logger = env_logger::Builder::from_env(Env::default().default_filter_or("warn"));
    match args.verbose {
        0 => {}
        1 => {
            logger.filter_level(LevelFilter::Debug);
        }
        _ => {
            logger.filter_level(LevelFilter::Trace);
        }
    }
    logger.init();

    let columns = Columns::from_str(&args.columns)
        .context("Invalid column list. Use comma-separated: kind,category,name,color,factor")?;

    let decoder = HeaderDecoder::with_options(DecodeOptions {
        retain_digital_attributes: args.digital_attributes,
    });

    let start_time = Instant::now();

    let header = if args.input.as_os_str() == "-" {
        decoder
            .decode_reader(&mut io::stdin().lock())
            .context("Failed to decode header from stdin")?
    } else {
        decoder
            .decode_file(&args.input)
            .with_context(|| format!("Failed to decode header in {:?}", args.input))?
    };

    let decode_duration = start_time.elapsed();

    match &args.output {
        Some(path) => {
            let output_ext = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("csv");
            if !output_ext.eq_ignore_ascii_case("csv") {
                anyhow::bail!("Unsupported output format: .{}. Use .csv", output_ext);
            }
            output::write_csv(path, &header, columns).context("Failed to write CSV output")?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = output::CsvWriter::new(stdout.lock(), columns);
            writer
                .write_header(Some(&header))
                .context("Failed to write channel listing")?;
            writer
                .write_channels(&header)
                .context("Failed to write channel listing")?;
            writer.flush().context("Failed to write channel listing")?;
        }
    }

    if !args.quiet {
        let mut stderr = io::stderr().lock();
        writeln!(stderr)?;
        writeln!(stderr, "Summary:")?;
        writeln!(stderr, "  Input:        {:?}", args.input)?;
        if let Some(path) = &args.output {
            writeln!(stderr, "  Output:       {:?}", path)?;
        }
        output::write_summary(&mut stderr, &header).context("Failed to write summary")?;
        writeln!(
            stderr,
            "  Duration:     {:.3}ms",
            decode_duration.as_secs_f64() * 1000.0
        )?;
    }

    Ok(())
}
