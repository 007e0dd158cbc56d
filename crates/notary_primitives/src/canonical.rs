//! Canonicalization of free-text inputs into fixed-width field encodings.
//!
//! Answers and usernames are normalized (lowercased, surrounding
//! whitespace stripped) before they are committed, so `"FINNEY "` and
//! `"finney"` produce the same field element. Interior whitespace is
//! preserved.

use thiserror::Error;

/// Width of a field encoding in bytes. Identities, commitments, masks and
/// keys are all scalars of this width.
pub const FIELD_WIDTH: usize = 32;

/// Fixed-width field encoding of a canonical string.
pub type FieldBytes = [u8; FIELD_WIDTH];

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalError {
    #[error("canonical form is {got} bytes, exceeds field width {max}")]
    TooLong { max: usize, got: usize },
}

/// Lowercase and strip surrounding whitespace.
///
/// Idempotent: `normalize(normalize(x)) == normalize(x)`.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Encode text into a fixed-width field: normalize, then left-align the
/// UTF-8 bytes and zero-pad to [`FIELD_WIDTH`].
pub fn to_field(text: &str) -> Result<FieldBytes, CanonicalError> {
    let canonical = normalize(text);
    let bytes = canonical.as_bytes();
    if bytes.len() > FIELD_WIDTH {
        return Err(CanonicalError::TooLong {
            max: FIELD_WIDTH,
            got: bytes.len(),
        });
    }
    let mut out = [0u8; FIELD_WIDTH];
    out[..bytes.len()].copy_from_slice(bytes);
    Ok(out)
}
