//! Core decoding and I/O: ROH records, reference curve, wavelength axis,
//! and the report writer.

pub mod decoder;
pub mod reference;
pub mod wavelength;
pub mod writers;
