//! Command-line interface for the ROH conversion pipeline.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::PathBuf;
use std::time::Instant;

use crate::config::PipelineConfig;
use crate::core::decoder::RohRecord;
use crate::core::reference::ReferenceCurve;
use crate::processors::calibration::CalibrationOptions;
use crate::processors::convert::{self, ConvertOptions};

#[derive(Parser)]
#[command(name = "roh-pipeline")]
#[command(about = "Avantes ROH spectrometer conversion pipeline", version)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert ROH files to calibrated wavelength/intensity reports
    Convert {
        /// ROH files to convert
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Skip the calibration curve and outlier removal, emit raw counts
        #[arg(long)]
        raw: bool,
        /// Keep detected noise spikes
        #[arg(long)]
        keep_outliers: bool,
        /// Keep the second-order diffraction artifact
        #[arg(long)]
        keep_second_order: bool,
        /// Leave originals in place instead of moving them to the archive
        #[arg(long)]
        keep_original: bool,
        /// Override the reference curve path from the config
        #[arg(long)]
        calibration: Option<PathBuf>,
    },

    /// Decode a ROH file and print its header fields
    Inspect {
        /// ROH file to inspect
        file: PathBuf,
    },
}

/// Spinner shown while the batch runs
fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(120));
    pb.set_message(message);
    pb
}

/// Print a boxed key/value summary
fn print_summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("╔══════════════════════════════════════════════════╗");
    println!("║ {:<48} ║", title);
    println!("╠══════════════════════════════════════════════════╣");
    for (key, value) in items {
        let display_value = if value.len() > 30 {
            format!("{}...", &value[..27])
        } else {
            value.clone()
        };
        println!("║ {:<16}: {:<30} ║", key, display_value);
    }
    println!("╚══════════════════════════════════════════════════╝");
    println!();
}

pub fn run() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity (must come first)
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_timestamp_secs()
        .init();

    // Load config
    let config = match &cli.config {
        Some(path) => match PipelineConfig::from_yaml(path) {
            Ok(cfg) => {
                info!("Loaded config from: {}", path.display());
                cfg
            }
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}, using defaults",
                    path.display(),
                    e
                );
                PipelineConfig::default()
            }
        },
        None => PipelineConfig::default(),
    };

    match cli.command {
        Commands::Convert {
            files,
            raw,
            keep_outliers,
            keep_second_order,
            keep_original,
            calibration,
        } => {
            let options = ConvertOptions {
                calibration: CalibrationOptions {
                    raw,
                    keep_outliers,
                    keep_second_order,
                },
                keep_original,
            };
            cmd_convert(&files, &options, calibration, &config);
        }
        Commands::Inspect { file } => {
            cmd_inspect(&file);
        }
    }
}

fn cmd_convert(
    files: &[PathBuf],
    options: &ConvertOptions,
    calibration: Option<PathBuf>,
    config: &PipelineConfig,
) {
    let start = Instant::now();

    // The reference curve is loaded once and shared read-only across all
    // files. Without it calibration is impossible, so a load failure is
    // fatal for the whole run unless raw mode was requested.
    let reference = if options.calibration.raw {
        None
    } else {
        let path = calibration.unwrap_or_else(|| config.reference.path.clone());
        match ReferenceCurve::load(&path) {
            Ok(curve) => {
                info!(
                    "Loaded reference curve from {} ({} samples)",
                    path.display(),
                    curve.len()
                );
                Some(curve)
            }
            Err(e) => {
                error!("Cannot calibrate without a reference curve: {}", e);
                std::process::exit(1);
            }
        }
    };

    let mode = if options.calibration.raw {
        "raw"
    } else {
        "calibrated"
    };
    let spinner = create_spinner(format!(
        "Converting {} ROH file(s) ({} mode)...",
        files.len(),
        mode
    ));
    let summary = convert::convert_batch(files, reference.as_ref(), options, config);
    spinner.finish_and_clear();

    print_summary(
        "Conversion Complete",
        &[
            ("Files given", files.len().to_string()),
            ("Converted", summary.converted.to_string()),
            ("Failed", summary.failed.to_string()),
            ("Mode", mode.to_string()),
            ("Originals kept", options.keep_original.to_string()),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );

    if summary.converted == 0 && summary.failed > 0 {
        std::process::exit(1);
    }
}

fn cmd_inspect(file: &PathBuf) {
    let record = match RohRecord::from_file(file) {
        Ok(record) => record,
        Err(e) => {
            error!("Failed to decode {}: {}", file.display(), e);
            std::process::exit(1);
        }
    };

    print_summary(
        "ROH Record",
        &[
            ("File", file.display().to_string()),
            ("Pixel range", format!("{}..{}", record.pix_first, record.pix_last)),
            ("Samples", record.spectrum.len().to_string()),
            ("Integration (ms)", record.integration_ms.to_string()),
            ("Averaging", record.averaging.to_string()),
            ("Pixel smoothing", record.pixel_smoothing.to_string()),
            ("Wl intercept", record.wl_intercept.to_string()),
            ("Wl coefficients", format!("{:?}", record.wl_coeff)),
        ],
    );
}
