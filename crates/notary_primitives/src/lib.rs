#![forbid(unsafe_code)]
#![deny(warnings, clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

//! Notary recovery primitives: domain-tagged SHA3-256 hashing with length
//! framing, fixed-width little-endian encodings, constant-time equality,
//! and canonicalization of free text into fixed-width field encodings.
//!
//! Every hash in the protocol goes through [`h_tag`]; tags live in
//! [`constants`] under the `notary.*` namespace so no two derivations can
//! collide across purposes.

use sha3::{Digest, Sha3_256};
use subtle::ConstantTimeEq;

pub mod canonical;
pub mod constants;

/// 32-byte hash (SHA3-256 output).
pub type Hash256 = [u8; 32];

/// Convert an unsigned integer to fixed-width little-endian bytes.
///
/// The output is exactly `W` bytes (no overlong encodings).
#[must_use]
#[allow(clippy::cast_possible_truncation)] // masked to one byte before the cast
pub fn le_bytes<const W: usize>(mut x: u128) -> [u8; W] {
    let mut out = [0u8; W];
    let mut i = 0usize;
    while i < W {
        out[i] = (x & 0xFF) as u8;
        x >>= 8;
        i += 1;
    }
    out
}

/// Domain-tagged SHA3-256 with length framing:
/// `H(tag, parts[])` = `SHA3_256`( UTF8(tag) || Σ ( LE(|p|, 8) || p ) )
#[must_use]
pub fn h_tag(tag: &str, parts: &[&[u8]]) -> Hash256 {
    // All protocol tags live in the `notary.` namespace.
    debug_assert!(
        tag.starts_with("notary."),
        "non-notary.* tag used in protocol hashing: {tag}"
    );
    let mut hasher = Sha3_256::new();
    hasher.update(tag.as_bytes());
    for p in parts {
        let len_le = le_bytes::<8>(p.len() as u128);
        hasher.update(len_le);
        hasher.update(p);
    }
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Constant-time equality for two 32-byte hashes.
#[must_use]
pub fn ct_eq_hash(a: &Hash256, b: &Hash256) -> bool {
    a.ct_eq(b).into()
}
