//! Second-order diffraction artifact subtraction.
//!
//! A grating spectrometer leaks a scaled copy of the signal at wavelength
//! 2λ into the pixel reading at λ. The correction samples the measured
//! spectrum at doubled wavelengths, scales it by an empirically measured
//! amplitude ratio, resamples it back onto the original wavelength grid by
//! piecewise-linear interpolation, and subtracts it.

/// Piecewise-linear interpolation with edge clamping.
///
/// `xp` must be ascending. Query points outside `[xp[0], xp[last]]` take
/// the nearest edge value.
pub fn interp_linear(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    debug_assert_eq!(xp.len(), fp.len());
    if xp.is_empty() {
        return 0.0;
    }
    if x <= xp[0] {
        return fp[0];
    }
    let last = xp.len() - 1;
    if x >= xp[last] {
        return fp[last];
    }

    // First knot strictly greater than x; the preceding knot exists since
    // x > xp[0].
    let hi = xp.partition_point(|&v| v <= x);
    let lo = hi - 1;
    let t = (x - xp[lo]) / (xp[hi] - xp[lo]);
    fp[lo] + t * (fp[hi] - fp[lo])
}

/// Subtract the second-order artifact from the spectrum in place.
///
/// The artifact estimate at wavelength λ is
/// `amplitude * spectrum(2λ)` evaluated on a snapshot of the spectrum
/// taken before any subtraction, so the correction is not applied to
/// itself.
pub fn subtract_second_order(spec: &mut [f64], axis: &[f64], amplitude: f64) {
    debug_assert_eq!(spec.len(), axis.len());
    if spec.is_empty() {
        return;
    }

    let doubled: Vec<f64> = axis.iter().map(|&w| 2.0 * w).collect();
    let scaled: Vec<f64> = spec.iter().map(|&v| v * amplitude).collect();

    for (value, &wavelength) in spec.iter_mut().zip(axis) {
        *value -= interp_linear(wavelength, &doubled, &scaled);
    }
}
