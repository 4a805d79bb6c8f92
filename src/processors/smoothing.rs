//! Boxcar kernels and same-length linear convolution.
//!
//! All smoothing in the pipeline is built from normalized boxcar kernels
//! convolved in "same" output-length mode: the output has the input's
//! length and the signal is implicitly zero-padded at both ends.

/// Build a boxcar averaging kernel of odd length `1 + 2*half_width`.
///
/// All taps are equal and the kernel sums to 1. `half_width = 0` yields
/// the identity kernel `[1]`.
pub fn boxcar_kernel(half_width: usize) -> Vec<f64> {
    let len = 1 + 2 * half_width;
    vec![1.0 / len as f64; len]
}

/// Build a symmetric neighbor-averaging kernel that skips the center tap.
///
/// `reach = 1` gives `[0.5, 0, 0.5]` (average of the adjacent neighbors),
/// `reach = 2` gives `[0.5, 0, 0, 0, 0.5]` (average of the neighbors two
/// pixels away).
pub fn skip_center_kernel(reach: usize) -> Vec<f64> {
    let len = 1 + 2 * reach;
    let mut kernel = vec![0.0; len];
    kernel[0] = 0.5;
    kernel[len - 1] = 0.5;
    kernel
}

/// Linear convolution in "same" output-length mode.
///
/// Matches the centered slice of the full convolution: the output has
/// `signal.len()` samples and out-of-range signal samples contribute zero.
pub fn convolve_same(signal: &[f64], kernel: &[f64]) -> Vec<f64> {
    if signal.is_empty() || kernel.is_empty() {
        return vec![0.0; signal.len()];
    }

    let offset = (kernel.len() - 1) / 2;
    let mut out = Vec::with_capacity(signal.len());
    for i in 0..signal.len() {
        let mut acc = 0.0;
        for (t, &k) in kernel.iter().enumerate() {
            // out[i] is sample i + offset of the full convolution
            let j = (i + offset) as isize - t as isize;
            if j >= 0 && (j as usize) < signal.len() {
                acc += k * signal[j as usize];
            }
        }
        out.push(acc);
    }
    out
}
