//! Loader for the spectrometer calibration reference curve.
//!
//! The reference curve is the measured spectrum of a calibration lamp,
//! stored as a plain-text file with whitespace-separated numeric columns,
//! one sample per line in pixel order. Only the second column is used.
//! The curve is loaded once per run and shared read-only across all files.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while loading the reference curve.
#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("failed to read reference curve '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed reference curve '{path}' at line {line}: expected two numeric columns")]
    MalformedLine { path: PathBuf, line: usize },

    #[error("reference curve '{0}' contains no samples")]
    Empty(PathBuf),
}

/// Result type for reference curve operations.
pub type Result<T> = std::result::Result<T, ReferenceError>;

/// Immutable per-pixel calibration lamp curve.
///
/// Alignment with the measured spectrum is positional: sample `i` of the
/// curve corresponds to sample `i` of the spectrum. Neither file stores an
/// explicit offset, so alignment is a calibration assumption.
#[derive(Debug, Clone)]
pub struct ReferenceCurve {
    values: Vec<f64>,
}

impl ReferenceCurve {
    /// Load the curve from a two-column text file.
    ///
    /// Blank lines and `#` comment lines are skipped. Any other line must
    /// carry at least two whitespace-separated columns with a numeric
    /// second column.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ReferenceError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let reader = BufReader::new(file);

        let mut values = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| ReferenceError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let value = trimmed
                .split_whitespace()
                .nth(1)
                .and_then(|col| col.parse::<f64>().ok())
                .ok_or_else(|| ReferenceError::MalformedLine {
                    path: path.to_path_buf(),
                    line: idx + 1,
                })?;
            values.push(value);
        }

        if values.is_empty() {
            return Err(ReferenceError::Empty(path.to_path_buf()));
        }

        Ok(Self { values })
    }

    /// Build a curve directly from sample values.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Per-pixel curve samples.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of samples in the curve.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the curve holds no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_second_column() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# wavelength counts").unwrap();
        writeln!(file, "200.0 1.5").unwrap();
        writeln!(file, "201.0\t2.5").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "202.0 3.5 99.0").unwrap();
        file.flush().unwrap();

        let curve = ReferenceCurve::load(file.path()).unwrap();
        assert_eq!(curve.values(), &[1.5, 2.5, 3.5]);
        assert_eq!(curve.len(), 3);
    }

    #[test]
    fn test_missing_file() {
        let err = ReferenceCurve::load("no_such_curve.dat").unwrap_err();
        assert!(matches!(err, ReferenceError::Io { .. }));
    }

    #[test]
    fn test_malformed_line() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "200.0 1.5").unwrap();
        writeln!(file, "201.0 not_a_number").unwrap();
        file.flush().unwrap();

        let err = ReferenceCurve::load(file.path()).unwrap_err();
        match err {
            ReferenceError::MalformedLine { line, .. } => assert_eq!(line, 2),
            other => panic!("expected MalformedLine, got {:?}", other),
        }
    }

    #[test]
    fn test_single_column_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "200.0").unwrap();
        file.flush().unwrap();

        assert!(ReferenceCurve::load(file.path()).is_err());
    }

    #[test]
    fn test_empty_file_rejected() {
        let file = NamedTempFile::new().unwrap();
        let err = ReferenceCurve::load(file.path()).unwrap_err();
        assert!(matches!(err, ReferenceError::Empty(_)));
    }
}
