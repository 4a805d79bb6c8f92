//! Conversion pipeline for Avantes ROH spectrometer records.
//!
//! This crate provides tools for:
//! - Decoding the binary little-endian ROH record format
//! - Deriving the wavelength axis from the per-device quartic polynomial
//! - Calibrating against a reference lamp curve (nonuniformity,
//!   integration time, lamp response)
//! - Suppressing isolated noise spikes and subtracting the second-order
//!   diffraction artifact
//! - Writing two-column text reports and archiving processed originals
//!
//! # Example
//!
//! ```no_run
//! use roh_pipeline::core::decoder::RohRecord;
//! use roh_pipeline::core::wavelength::wavelength_axis;
//!
//! let record = RohRecord::from_file("scan01.ROH").unwrap();
//! let axis = wavelength_axis(&record).unwrap();
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod processors;

pub use config::{CalibrationConfig, OutputConfig, PipelineConfig, ReferenceConfig};
pub use core::decoder::RohRecord;
pub use core::reference::ReferenceCurve;
pub use processors::calibration::CalibrationOptions;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
