#![forbid(unsafe_code)]

//! Domain separation tags. One tag per derivation purpose; all tags are
//! `notary.*` ASCII and are asserted as such in the crate tests.

/// Identity hash over the normalized username field.
pub const TAG_IDENTITY: &str = "notary.identity";
/// Per-slot answer commitment (salted with the slot index).
pub const TAG_ANSWER: &str = "notary.answer";
/// Pairwise fold of commitments into the combined secret.
pub const TAG_FOLD: &str = "notary.fold";
