//! Per-file conversion driver and sequential batch loop.
//!
//! One file's processing is fully isolated: decode, derive the wavelength
//! axis, calibrate, write the report, archive the originals. A failure in
//! any step aborts that file only; the batch loop logs it and moves on.
//! The reference curve is the only state shared between files and is
//! read-only.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{error, info, warn};

use crate::config::PipelineConfig;
use crate::core::decoder::RohRecord;
use crate::core::reference::ReferenceCurve;
use crate::core::wavelength;
use crate::core::writers::{self, ReportHeader};

use super::archive;
use super::calibration::{self, CalibrationOptions};

/// Options for one conversion run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    /// Stage toggles forwarded to the calibration pipeline.
    pub calibration: CalibrationOptions,
    /// Leave the original ROH and sidecar files in place.
    pub keep_original: bool,
}

/// What one successful conversion produced.
#[derive(Debug, Clone)]
pub struct ConvertOutcome {
    /// Path of the written report.
    pub report_path: PathBuf,
    /// Number of spectrum samples.
    pub samples: usize,
    /// Integration time from the record header, in ms.
    pub integration_ms: f32,
}

/// Totals of a batch run, reported by the CLI summary.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Files converted successfully.
    pub converted: usize,
    /// Files skipped because of a per-file error.
    pub failed: usize,
    /// Reports written, in input order.
    pub reports: Vec<PathBuf>,
}

/// Convert a single ROH file end to end.
pub fn convert_file(
    path: &Path,
    reference: Option<&ReferenceCurve>,
    options: &ConvertOptions,
    config: &PipelineConfig,
) -> Result<ConvertOutcome> {
    let record = RohRecord::from_file(path)
        .with_context(|| format!("decoding {}", path.display()))?;
    info!(
        "{}: {} samples, integration {} ms, averaging {}, pixel smoothing {}",
        path.display(),
        record.spectrum.len(),
        record.integration_ms,
        record.averaging,
        record.pixel_smoothing,
    );

    let axis = wavelength::wavelength_axis(&record)?;
    let intensities = calibration::calibrate(
        &record,
        &axis,
        reference,
        &options.calibration,
        &config.calibration,
    )
    .with_context(|| format!("calibrating {}", path.display()))?;

    let comment = writers::read_sidecar_comment(path);
    let header = ReportHeader {
        comment: comment.clone(),
        source_name: path.display().to_string(),
        calibrated: !options.calibration.raw,
    };
    let report_path = writers::report_path_for(
        path,
        &config.output.report_suffix,
        options.calibration.raw,
        comment.as_deref(),
    );
    writers::write_report(&report_path, &axis, &intensities, &header)
        .with_context(|| format!("writing {}", report_path.display()))?;

    if !options.keep_original {
        if let Err(e) = archive::archive_originals(path, &config.output.archive_dir_name) {
            warn!("could not archive {}: {}", path.display(), e);
        }
    }

    Ok(ConvertOutcome {
        report_path,
        samples: record.spectrum.len(),
        integration_ms: record.integration_ms,
    })
}

/// Convert a list of ROH files sequentially.
///
/// Per-file failures are logged and counted; they never abort the run.
pub fn convert_batch(
    paths: &[PathBuf],
    reference: Option<&ReferenceCurve>,
    options: &ConvertOptions,
    config: &PipelineConfig,
) -> RunSummary {
    let mut summary = RunSummary::default();
    for path in paths {
        match convert_file(path, reference, options, config) {
            Ok(outcome) => {
                info!("wrote {}", outcome.report_path.display());
                summary.converted += 1;
                summary.reports.push(outcome.report_path);
            }
            Err(e) => {
                error!("skipping {}: {:#}", path.display(), e);
                summary.failed += 1;
            }
        }
    }
    summary
}
