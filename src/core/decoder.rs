//! Binary decoder for Avantes ROH spectrometer records.
//!
//! A ROH record is a dense sequence of little-endian IEEE-754 float32
//! values with no padding or separators:
//! - 21 header floats (device scalars, wavelength polynomial, pixel range)
//! - the spectrum payload, whose length is *not* stored in the file but
//!   derived from the pixel range in the header
//! - 3 trailing floats (integration time, averaging, pixel smoothing)

use std::fs;
use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, LittleEndian};
use thiserror::Error;

/// Number of float32 fields preceding the spectrum payload.
const HEADER_FLOATS: usize = 21;

/// Number of float32 fields following the spectrum payload.
const TRAILER_FLOATS: usize = 3;

/// Errors that can occur while decoding a ROH record.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("truncated record: needed {needed} bytes, found {available}")]
    Truncated { needed: usize, available: usize },

    #[error("negative spectrum length: pix_first={pix_first}, pix_last={pix_last}")]
    NegativeSpectrumLength { pix_first: f32, pix_last: f32 },
}

/// Result type for decoder operations.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// A decoded ROH record, field order matching the wire layout.
#[derive(Debug, Clone)]
pub struct RohRecord {
    /// Undocumented leading scalar.
    pub unknown1: f32,
    /// Constant term of the wavelength polynomial.
    pub wl_intercept: f32,
    /// Linear through quartic wavelength polynomial coefficients.
    pub wl_coeff: [f32; 4],
    /// Undocumented device scalars.
    pub unknown2: [f32; 9],
    /// First pixel of the readout window (fractional on the wire).
    pub pix_first: f32,
    /// Last pixel of the readout window (fractional on the wire).
    pub pix_last: f32,
    /// Undocumented device scalars.
    pub unknown3: [f32; 4],
    /// Raw counts, one per pixel.
    pub spectrum: Vec<f32>,
    /// Integration time in milliseconds.
    pub integration_ms: f32,
    /// Number of averaged exposures.
    pub averaging: f32,
    /// Instrument-reported smoothing half-width in pixels.
    pub pixel_smoothing: f32,
}

impl RohRecord {
    /// Decode a record from an in-memory byte buffer.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = FloatReader::new(bytes);

        let unknown1 = reader.read_f32()?;
        let wl_intercept = reader.read_f32()?;
        let wl_coeff = reader.read_array::<4>()?;
        let unknown2 = reader.read_array::<9>()?;
        let pix_first = reader.read_f32()?;
        let pix_last = reader.read_f32()?;
        let unknown3 = reader.read_array::<4>()?;

        // The payload length must be derived before the payload can be
        // consumed; it also determines where the trailer starts. A header
        // can claim a payload no buffer could hold, so the length is
        // bounded by the bytes actually present before any allocation.
        let n = spectrum_len(pix_first, pix_last)?;
        let payload_capacity = (bytes.len() / 4).saturating_sub(HEADER_FLOATS + TRAILER_FLOATS);
        if n > payload_capacity {
            return Err(DecodeError::Truncated {
                needed: (HEADER_FLOATS + TRAILER_FLOATS)
                    .saturating_add(n)
                    .saturating_mul(4),
                available: bytes.len(),
            });
        }

        let mut spectrum = Vec::with_capacity(n);
        for _ in 0..n {
            spectrum.push(reader.read_f32()?);
        }

        let integration_ms = reader.read_f32()?;
        let averaging = reader.read_f32()?;
        let pixel_smoothing = reader.read_f32()?;

        Ok(RohRecord {
            unknown1,
            wl_intercept,
            wl_coeff,
            unknown2,
            pix_first,
            pix_last,
            unknown3,
            spectrum,
            integration_ms,
            averaging,
            pixel_smoothing,
        })
    }

    /// Read and decode a record from a file on disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| DecodeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::decode(&bytes)
    }
}

/// Derive the spectrum payload length from the header pixel range.
///
/// Both pixel bounds are truncated toward zero before the subtraction,
/// matching the instrument's own layout arithmetic. A negative derived
/// length means the header is malformed and is rejected rather than
/// reproduced as an empty or undefined array.
pub fn spectrum_len(pix_first: f32, pix_last: f32) -> Result<usize> {
    // Saturating float casts can land on i64::MIN / i64::MAX, so the
    // subtraction itself must saturate instead of wrapping.
    let n = (pix_last as i64)
        .saturating_sub(pix_first as i64)
        .saturating_sub(1);
    if n < 0 {
        return Err(DecodeError::NegativeSpectrumLength {
            pix_first,
            pix_last,
        });
    }
    Ok(n as usize)
}

/// Sequential little-endian float32 reader over a byte slice.
struct FloatReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> FloatReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn read_f32(&mut self) -> Result<f32> {
        let end = self.pos + 4;
        if end > self.buf.len() {
            return Err(DecodeError::Truncated {
                needed: end,
                available: self.buf.len(),
            });
        }
        let value = LittleEndian::read_f32(&self.buf[self.pos..end]);
        self.pos = end;
        Ok(value)
    }

    fn read_array<const K: usize>(&mut self) -> Result<[f32; K]> {
        let mut out = [0.0f32; K];
        for slot in out.iter_mut() {
            *slot = self.read_f32()?;
        }
        Ok(out)
    }
}
