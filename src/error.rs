//! Per-frame decoding errors.

use thiserror::Error;

/// Reasons a single frame cannot be decoded. None of these are fatal to a run;
/// the offending frame is skipped and processing moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The frame ends before a field that has to be read.
    #[error("truncated frame: {field} needs {needed} bytes, have {have}")]
    Truncated {
        field: &'static str,
        needed: usize,
        have: usize,
    },
}

/// Borrow `frame[start..start + len]`, naming `field` if it is out of bounds.
pub(crate) fn field_bytes<'a>(
    frame: &'a [u8],
    field: &'static str,
    start: usize,
    len: usize,
) -> Result<&'a [u8], FrameError> {
    frame.get(start..start + len).ok_or(FrameError::Truncated {
        field,
        needed: start + len,
        have: frame.len(),
    })
}
