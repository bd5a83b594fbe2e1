mod analyzer;
mod config;
mod error;
mod export;
mod parser;
mod report;

use clap::Parser;
use config::{AnalysisConfig, DEFAULT_THRESH_404, DEFAULT_THRESH_5XX, DEFAULT_TOP_N};
use error::RunError;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Analyze combined-format web logs and detect suspicious IPs
#[derive(Parser, Debug)]
#[command(
    name = "logsentry",
    author,
    version,
    about = "Analyze web access logs and flag IPs with excessive 404 or 5xx responses"
)]
struct Args {
    /// Path to the access log to analyze
    #[arg(value_name = "LOG_FILE")]
    logfile: PathBuf,

    /// Flag IPs with at least this many 404 responses
    #[arg(long = "404-thresh", default_value_t = DEFAULT_THRESH_404, value_name = "COUNT")]
    thresh_404: usize,

    /// Flag IPs with at least this many 5xx responses
    #[arg(long = "5xx-thresh", default_value_t = DEFAULT_THRESH_5XX, value_name = "COUNT")]
    thresh_5xx: usize,

    /// Save the full report as JSON
    #[arg(long = "json", value_name = "OUTPUT_FILE")]
    json: Option<PathBuf>,

    /// Save the top paths as CSV
    #[arg(long = "csv-paths", value_name = "OUTPUT_FILE")]
    csv_paths: Option<PathBuf>,

    /// Number of top IPs and paths kept in the report
    #[arg(short = 'n', long = "top", default_value_t = DEFAULT_TOP_N, value_name = "N")]
    top_n: usize,

    /// Only log errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    quiet: bool,

    /// Log every skipped line (-v) or every parsed request (-vv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long = "no-color")]
    no_color: bool,
}

impl Args {
    fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            thresh_404: self.thresh_404,
            thresh_5xx: self.thresh_5xx,
            top_n: self.top_n,
        }
    }
}

fn init_logging(args: &Args) {
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!args.no_color)
        .without_time()
        .compact()
        .init();
}

/// Analyze, print the summary to `out`, then attempt every requested export.
///
/// Problems are reported on `err` as they happen; a failed summary or export
/// does not stop the remaining exports.
fn run<W: Write, E: Write>(args: &Args, out: &mut W, err: &mut E) -> Result<(), RunError> {
    let agg = match analyzer::analyze_file(&args.logfile) {
        Ok(agg) => agg,
        Err(e) => {
            let _ = writeln!(err, "error: {}", e);
            return Err(e.into());
        }
    };

    let source = args.logfile.display().to_string();
    let report = report::build_report(&agg, &source, &args.analysis_config());

    let mut summary_error = report::write_summary(out, &report).err();
    if let Some(e) = &summary_error {
        let _ = writeln!(err, "error: failed to write summary: {}", e);
    }

    let mut failed = 0usize;

    if let Some(json_path) = &args.json {
        match export::export_json(&report, json_path) {
            Ok(()) => {
                if let Err(e) = writeln!(out, "Saved JSON report to {}", json_path.display()) {
                    summary_error.get_or_insert(e);
                }
            }
            Err(e) => {
                let _ = writeln!(err, "error: {}", e);
                failed += 1;
            }
        }
    }

    if let Some(csv_path) = &args.csv_paths {
        match export::export_top_paths_csv(&report, csv_path) {
            Ok(()) => {
                if let Err(e) = writeln!(out, "Saved top paths CSV to {}", csv_path.display()) {
                    summary_error.get_or_insert(e);
                }
            }
            Err(e) => {
                let _ = writeln!(err, "error: {}", e);
                failed += 1;
            }
        }
    }

    if let Err(e) = out.flush() {
        summary_error.get_or_insert(e);
    }

    if let Some(e) = summary_error {
        Err(RunError::Summary(e))
    } else if failed > 0 {
        Err(RunError::Export { failed })
    } else {
        Ok(())
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args);
    if args.no_color {
        colored::control::set_override(false);
    }

    let stdout = io::stdout();
    let stderr = io::stderr();
    match run(&args, &mut stdout.lock(), &mut stderr.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!("run failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
