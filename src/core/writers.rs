//! Report writer for converted spectra.
//!
//! The human-readable report is a two-column text file (wavelength,
//! intensity) with `#`-prefixed header lines carrying either the
//! user-supplied RCM sidecar comment or the original input filename,
//! followed by a column-label line marking the spectrum as calibrated
//! or uncalibrated.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while writing a report.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Failed to create parent directories.
    #[error("failed to create parent directories for '{path}': {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or open the report file.
    #[error("failed to create report '{path}': {source}")]
    CreateFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write report data.
    #[error("failed to write report '{path}': {source}")]
    WriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Mismatched column lengths.
    #[error("column length mismatch: axis has {axis_len} samples, intensities has {intensity_len}")]
    LengthMismatch {
        axis_len: usize,
        intensity_len: usize,
    },
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Header metadata written above the data columns.
#[derive(Debug, Clone)]
pub struct ReportHeader {
    /// User comment from the RCM sidecar, if one was found.
    pub comment: Option<String>,
    /// Original input filename, used when no comment is available.
    pub source_name: String,
    /// Whether the intensity column went through the calibration stages.
    pub calibrated: bool,
}

/// Creates parent directories for a file path if they don't exist.
fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| ReportError::CreateDirectory {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
    }
    Ok(())
}

/// Write a two-column wavelength/intensity report.
///
/// Values are written with fixed 6-decimal formatting. Both columns must
/// have the same length; a mismatch is reported as an error rather than
/// truncated.
///
/// # Arguments
///
/// * `path` - Output file path (parent directories will be created if needed)
/// * `axis` - Wavelengths in nm
/// * `intensities` - Calibrated or raw intensity values
/// * `header` - Header metadata
///
/// # Errors
///
/// Returns an error if the columns disagree in length or the file cannot
/// be created or written to.
pub fn write_report(
    path: &Path,
    axis: &[f64],
    intensities: &[f64],
    header: &ReportHeader,
) -> Result<()> {
    if axis.len() != intensities.len() {
        return Err(ReportError::LengthMismatch {
            axis_len: axis.len(),
            intensity_len: intensities.len(),
        });
    }

    ensure_parent_dirs(path)?;

    let file = File::create(path).map_err(|e| ReportError::CreateFile {
        path: path.display().to_string(),
        source: e,
    })?;
    let mut writer = BufWriter::new(file);
    let path_str = path.display().to_string();

    let write_err = |e: std::io::Error| ReportError::WriteFile {
        path: path_str.clone(),
        source: e,
    };

    match &header.comment {
        Some(comment) => writeln!(writer, "# user_comment={}", comment).map_err(write_err)?,
        None => {
            writeln!(writer, "# original_filename={}", header.source_name).map_err(write_err)?
        }
    }
    let label = if header.calibrated {
        "calibrated"
    } else {
        "uncalibrated"
    };
    writeln!(writer, "# wavelength(nm) {}_intensity", label).map_err(write_err)?;

    for (wavelength, intensity) in axis.iter().zip(intensities) {
        writeln!(writer, "{:.6} {:.6}", wavelength, intensity).map_err(write_err)?;
    }

    writer.flush().map_err(|e| ReportError::WriteFile {
        path: path_str,
        source: e,
    })?;

    Ok(())
}

/// Read the user comment from the RCM sidecar next to a ROH file.
///
/// The sidecar shares the ROH file's stem with an `RCM` extension. Its
/// content is trimmed and the first 3 characters (a device prefix) are
/// stripped. A missing or unreadable sidecar is not an error; the caller
/// falls back to the input filename.
pub fn read_sidecar_comment(roh_path: &Path) -> Option<String> {
    let sidecar = roh_path.with_extension("RCM");
    let content = fs::read_to_string(sidecar).ok()?;
    Some(content.trim().chars().skip(3).collect())
}

/// Build the report path for an input file.
///
/// The report lands next to the input as
/// `<input><suffix>[raw_]<comment>.dat`, mirroring the converter's
/// historical naming so downstream tooling keeps working.
pub fn report_path_for(input: &Path, suffix: &str, raw: bool, comment: Option<&str>) -> PathBuf {
    let mut name = input.as_os_str().to_os_string();
    name.push(suffix);
    if raw {
        name.push("raw_");
    }
    if let Some(comment) = comment {
        name.push(comment);
    }
    name.push(".dat");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_report_with_comment() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.dat");
        let header = ReportHeader {
            comment: Some("sample A".to_string()),
            source_name: "input.ROH".to_string(),
            calibrated: true,
        };

        write_report(&path, &[500.0, 501.0], &[1.5, 2.0], &header).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "# user_comment=sample A");
        assert_eq!(lines[1], "# wavelength(nm) calibrated_intensity");
        assert_eq!(lines[2], "500.000000 1.500000");
        assert_eq!(lines[3], "501.000000 2.000000");
    }

    #[test]
    fn test_write_report_uncalibrated_fallback() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.dat");
        let header = ReportHeader {
            comment: None,
            source_name: "input.ROH".to_string(),
            calibrated: false,
        };

        write_report(&path, &[500.0], &[1.0], &header).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "# original_filename=input.ROH");
        assert_eq!(lines[1], "# wavelength(nm) uncalibrated_intensity");
    }

    #[test]
    fn test_write_report_length_mismatch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.dat");
        let header = ReportHeader {
            comment: None,
            source_name: String::new(),
            calibrated: true,
        };

        let result = write_report(&path, &[500.0, 501.0], &[1.0], &header);
        assert!(matches!(
            result.unwrap_err(),
            ReportError::LengthMismatch { .. }
        ));
    }

    #[test]
    fn test_read_sidecar_comment_strips_prefix() {
        let dir = tempdir().unwrap();
        let roh = dir.path().join("scan01.ROH");
        fs::write(dir.path().join("scan01.RCM"), "01=my measurement \n").unwrap();

        let comment = read_sidecar_comment(&roh);
        assert_eq!(comment.as_deref(), Some("my measurement"));
    }

    #[test]
    fn test_read_sidecar_comment_missing() {
        let dir = tempdir().unwrap();
        let roh = dir.path().join("scan01.ROH");
        assert_eq!(read_sidecar_comment(&roh), None);
    }

    #[test]
    fn test_report_path_naming() {
        let path = report_path_for(Path::new("scan01.ROH"), "_converted_", false, Some("lamp"));
        assert_eq!(path, PathBuf::from("scan01.ROH_converted_lamp.dat"));

        let raw = report_path_for(Path::new("scan01.ROH"), "_converted_", true, None);
        assert_eq!(raw, PathBuf::from("scan01.ROH_converted_raw_.dat"));
    }
}
