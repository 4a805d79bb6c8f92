//! Configuration types for the conversion pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Empirically measured amplitude ratio of the second-order diffraction
/// artifact, a difference of peak ratios measured on three reference lines.
pub const DEFAULT_SECOND_ORDER_AMPLITUDE: f64 =
    178.0 / 12900.0 + 322.0 / 4348.0 - 300.0 / 3176.0;

/// Configuration for the reference calibration curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceConfig {
    /// Path to the two-column calibration lamp curve.
    #[serde(default = "default_reference_path")]
    pub path: PathBuf,
}

fn default_reference_path() -> PathBuf {
    PathBuf::from("calibration_curve.dat")
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            path: default_reference_path(),
        }
    }
}

/// Configuration for the calibration and denoising stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Spike detection threshold as a multiple of the first-difference RMS.
    #[serde(default = "default_outlier_threshold_sigma")]
    pub outlier_threshold_sigma: f64,

    /// Amplitude ratio of the second-order artifact. Set to 0 to disable
    /// the subtraction without changing the stage order.
    #[serde(default = "default_second_order_amplitude")]
    pub second_order_amplitude: f64,
}

fn default_outlier_threshold_sigma() -> f64 {
    1.0
}

fn default_second_order_amplitude() -> f64 {
    DEFAULT_SECOND_ORDER_AMPLITUDE
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            outlier_threshold_sigma: default_outlier_threshold_sigma(),
            second_order_amplitude: default_second_order_amplitude(),
        }
    }
}

/// Configuration for report naming and archiving.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Name of the per-directory archive folder for processed originals.
    #[serde(default = "default_archive_dir_name")]
    pub archive_dir_name: String,

    /// Suffix inserted between the input filename and the report name.
    #[serde(default = "default_report_suffix")]
    pub report_suffix: String,
}

fn default_archive_dir_name() -> String {
    "orig".to_string()
}

fn default_report_suffix() -> String {
    "_converted_".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            archive_dir_name: default_archive_dir_name(),
            report_suffix: default_report_suffix(),
        }
    }
}

/// Main pipeline configuration combining all sub-configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub reference: ReferenceConfig,

    #[serde(default)]
    pub calibration: CalibrationConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl PipelineConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
