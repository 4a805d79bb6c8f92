//! Isolated noise spike suppression.
//!
//! Single-pixel spikes (cosmic hits, readout glitches) are detected by
//! comparing each interior sample against the average of its immediate
//! neighbors and replaced by the average of the neighbors two pixels away,
//! so the replacement value is not contaminated by the spike itself.

use super::smoothing::{convolve_same, skip_center_kernel};

/// Root-mean-square of the first differences of a signal.
///
/// Used as the noise-level estimate for spike detection. Returns 0 for
/// signals with fewer than two samples.
pub fn first_difference_rms(signal: &[f64]) -> f64 {
    if signal.len() < 2 {
        return 0.0;
    }
    let sum_sq: f64 = signal.windows(2).map(|w| (w[1] - w[0]).powi(2)).sum();
    (sum_sq / (signal.len() - 1) as f64).sqrt()
}

/// Replace isolated spikes in place and return the number of replacements.
///
/// A sample is flagged when it deviates from the average of its distance-1
/// neighbors by more than `threshold_sigma` times the first-difference RMS
/// of the whole signal. Flagged samples are replaced by the average of
/// their distance-2 neighbors. This is a single non-iterative pass; both
/// neighbor averages are computed from the original signal. The first and
/// last samples lack two-sided neighbors and are never modified.
pub fn suppress_spikes(spec: &mut [f64], threshold_sigma: f64) -> usize {
    if spec.len() < 3 {
        return 0;
    }

    let smooth_near = convolve_same(spec, &skip_center_kernel(1));
    let smooth_far = convolve_same(spec, &skip_center_kernel(2));
    let noise = first_difference_rms(spec);

    let mut replaced = 0;
    for i in 1..spec.len() - 1 {
        if (spec[i] - smooth_near[i]).abs() > threshold_sigma * noise {
            spec[i] = smooth_far[i];
            replaced += 1;
        }
    }
    replaced
}
