//! Processing stages: smoothing primitives, calibration, spike
//! suppression, second-order artifact subtraction, archiving, and the
//! per-file conversion driver.

pub mod archive;
pub mod calibration;
pub mod convert;
pub mod outliers;
pub mod second_order;
pub mod smoothing;
