//! slot_grid CLI: infer the slot layout of vending machines from photographs.
//!
//! Exits with `10 × slots + rows` for the last processed photograph, or with
//! the negative code of its failure class.

use clap::Parser;
use slot_grid::config::{load_config, RuntimeConfig};
use slot_grid::image::io::{as_view, load_grayscale_image, load_value_image, write_json_file};
use slot_grid::{ExtractionReport, GridError, SlotGridExtractor};
use std::path::{Path, PathBuf};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

/// Exit code for failures before any photograph is processed.
const SETUP_FAILURE: i32 = -4;

#[derive(Parser, Debug)]
#[command(name = "slot_grid")]
#[command(about = "Infer drink slot rectangles from vending machine photographs")]
#[command(version)]
struct Cli {
    /// Photographs to process.
    images: Vec<PathBuf>,

    /// JSON runtime configuration (input path, output, extractor parameters).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Highlight detection threshold; detected from the histogram when omitted.
    #[arg(short = 'T', long)]
    threshold: Option<u8>,

    /// Disable perspective adjustment of the column edges.
    #[arg(long)]
    no_perspective: bool,

    /// Keep drink rectangles at full slot height instead of trimming them to the container.
    #[arg(long)]
    no_trim: bool,

    /// Write the extraction report (JSON) to this path.
    #[arg(long)]
    json_out: Option<PathBuf>,

    /// Batch mode: no per-photograph summary.
    #[arg(short, long)]
    batch: bool,

    /// Log every stage at debug level.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let code = match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err}");
            SETUP_FAILURE
        }
    };
    std::process::exit(code);
}

fn run(cli: &Cli) -> CliResult<i32> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RuntimeConfig::default(),
    };
    if cli.threshold.is_some() {
        config.params.detection_threshold = cli.threshold;
    }
    if cli.no_perspective {
        config.params.consensus.perspective = false;
    }
    if cli.no_trim {
        config.params.rects.trim_to_container = false;
    }
    if cli.json_out.is_some() {
        config.output.json_out = cli.json_out.clone();
    }

    let mut images = cli.images.clone();
    if images.is_empty() {
        images.extend(config.input_path.clone());
    }
    if images.is_empty() {
        return Err("no input photographs given".into());
    }

    let extractor = SlotGridExtractor::new(config.params.clone());
    let mut code = 0;
    for path in &images {
        code = match process_file(&extractor, path) {
            Ok(report) => {
                if !cli.batch {
                    print_summary(path, &report);
                }
                if let Some(out) = &config.output.json_out {
                    let out = report_path(out, path, images.len() > 1);
                    write_json_file(&out, &report)?;
                    if !cli.batch {
                        println!("JSON report written to {}", out.display());
                    }
                }
                report.result.configuration_code()
            }
            Err(err) => {
                eprintln!("{}: {err}", path.display());
                err.exit_code()
            }
        };
    }
    Ok(code)
}

fn process_file(
    extractor: &SlotGridExtractor,
    path: &Path,
) -> Result<ExtractionReport, GridError> {
    let gray = load_grayscale_image(path)?;
    let values = load_value_image(path)?;
    extractor.process_with_diagnostics(as_view(&gray), Some(&values))
}

fn print_summary(path: &Path, report: &ExtractionReport) {
    let result = &report.result;
    println!("{}", path.display());
    println!("  {}", report.summary());
    for row in &result.rows {
        println!(
            "  row {:>2}: strip y={} slots={} height={}",
            row.strip_index,
            row.strip_region.y,
            row.drinks.len(),
            row.slots_height
        );
    }
    println!(
        "Detected configuration: {}x{}",
        result.slot_count,
        result.row_count()
    );
}

/// With several inputs every report gets the photograph's stem as prefix.
fn report_path(out: &Path, image: &Path, many: bool) -> PathBuf {
    if !many {
        return out.to_path_buf();
    }
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = out
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report.json".to_string());
    out.with_file_name(format!("{stem}_{name}"))
}
