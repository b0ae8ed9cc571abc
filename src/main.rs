//! pagediff command-line interface.
//!
//! Compares two snapshot files and prints what changed in the newer one.
//! Exit status: 0 when nothing changed, 1 when changes were found, 2 on
//! bad input or configuration, 3 when the diff could not be computed.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use pagediff_rs::{
    diff_documents, format_outcome, parse_file, DiffError, OutputFormat, OutputOptions, Settings,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const EXIT_UNAVAILABLE: i32 = 3;

/// pagediff - report what changed between two snapshots
///
/// Compares JSON, XML/HTML and plain-text snapshots of the same resource and
/// prints the values, elements or words that changed in NEW.
#[derive(Parser)]
#[command(name = "pagediff-rs")]
#[command(version)]
#[command(about = "Change detection between two snapshots", long_about = None)]
struct Cli {
    /// Baseline snapshot
    #[arg(value_name = "OLD")]
    old: PathBuf,

    /// Snapshot to report on
    #[arg(value_name = "NEW")]
    new: PathBuf,

    /// Acknowledged location (or word, for text) to leave out of the report
    #[arg(long = "exclude", value_name = "LOC")]
    exclude: Vec<String>,

    /// Location pattern to leave out of the report (e.g. "**.timestamp")
    #[arg(long = "ignore", value_name = "PATTERN")]
    ignore: Vec<String>,

    /// Treat JSON values containing this substring as noise
    #[arg(long = "sign", value_name = "TOKEN")]
    sign: Vec<String>,

    /// TOML settings file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Declared content type of both snapshots (e.g. "application/json")
    #[arg(long, value_name = "MIME")]
    content_type: Option<String>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "plain")]
    format: OutputFormatArg,

    /// Show full values instead of previews
    #[arg(long)]
    show_values: bool,

    /// Maximum length for displayed values
    #[arg(long, default_value = "80")]
    max_value_length: usize,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (suppress the summary line)
    #[arg(short, long)]
    quiet: bool,
}

/// Output format argument for clap
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum OutputFormatArg {
    /// The bare report
    Plain,
    /// JSON representation
    Json,
    /// Colored terminal output
    Terminal,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Plain => OutputFormat::Plain,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Terminal => OutputFormat::Terminal,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(exit_code) => process::exit(exit_code),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            let code = if err.downcast_ref::<DiffError>().is_some() {
                EXIT_UNAVAILABLE
            } else {
                2
            };
            process::exit(code);
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = if verbose {
        EnvFilter::new(level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<i32> {
    let settings = match &cli.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load settings: {}", path.display()))?,
        None => Settings::default(),
    };
    let config = settings
        .merge(Settings {
            exclude: cli.exclude,
            ignore: cli.ignore,
            sign_tokens: cli.sign,
            max_depth: None,
        })
        .into_diff_config();

    let content_type = cli.content_type.as_deref();
    let old = parse_file(&cli.old, content_type)
        .with_context(|| format!("Failed to parse old snapshot: {}", cli.old.display()))?;
    tracing::debug!("Parsed {} as {}", cli.old.display(), old.kind());

    let new = parse_file(&cli.new, content_type)
        .with_context(|| format!("Failed to parse new snapshot: {}", cli.new.display()))?;
    tracing::debug!("Parsed {} as {}", cli.new.display(), new.kind());

    let outcome = diff_documents(&old, &new, &config)?;

    let output_options = OutputOptions {
        show_values: cli.show_values,
        max_value_length: cli.max_value_length,
    };
    let output_format: OutputFormat = cli.format.into();
    let output = format_outcome(&outcome, &new, &output_format, &output_options)
        .context("Failed to format diff output")?;

    match output_format {
        OutputFormat::Plain => print!("{}", output),
        _ if cli.quiet => {
            for line in output.lines() {
                if !line.starts_with("Summary:") && !line.trim().is_empty() {
                    println!("{}", line);
                }
            }
        }
        _ => println!("{}", output),
    }
    io::stdout().flush().context("Failed to write report")?;

    if outcome.is_empty() {
        Ok(0)
    } else {
        Ok(1)
    }
}
