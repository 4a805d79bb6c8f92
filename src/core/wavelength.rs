//! Wavelength axis derivation from the ROH header polynomial.
//!
//! The instrument maps pixel indices to wavelengths with a per-device
//! quartic polynomial. Pixel indices run from `trunc(pix_first) + 2`
//! through `trunc(pix_last)` inclusive, which yields exactly one index
//! per spectrum sample.

use thiserror::Error;

use super::decoder::RohRecord;

/// Errors that can occur while deriving the wavelength axis.
#[derive(Error, Debug)]
pub enum AxisError {
    #[error("wavelength axis has {axis_len} samples but the spectrum has {spectrum_len}")]
    LengthMismatch {
        axis_len: usize,
        spectrum_len: usize,
    },
}

/// Compute the wavelength (nm) for each spectrum sample.
///
/// The axis is a derived value and is not stored back into the record.
/// An axis/spectrum length mismatch indicates a decoder or header
/// inconsistency and is reported rather than silently truncated.
pub fn wavelength_axis(record: &RohRecord) -> Result<Vec<f64>, AxisError> {
    let first = record.pix_first as i64;
    let last = record.pix_last as i64;
    let [c1, c2, c3, c4] = record.wl_coeff.map(f64::from);
    let intercept = f64::from(record.wl_intercept);

    let mut axis = Vec::with_capacity(record.spectrum.len());
    for x0 in (first + 2)..=last {
        let x = x0 as f64;
        axis.push(intercept + c1 * x + c2 * x * x + c3 * x.powi(3) + c4 * x.powi(4));
    }

    if axis.len() != record.spectrum.len() {
        return Err(AxisError::LengthMismatch {
            axis_len: axis.len(),
            spectrum_len: record.spectrum.len(),
        });
    }
    Ok(axis)
}
