//! Commitment builder: salted per-slot answer commitments, the
//! order-sensitive fold into the combined secret, and the XOR mask over
//! the master key. Pure, offline, stateless; safe to call concurrently.

use notary_primitives::canonical::to_field;
use notary_primitives::constants::{TAG_ANSWER, TAG_FOLD, TAG_IDENTITY};
use notary_primitives::{h_tag, le_bytes, Hash256};

use crate::errors::SetupError;
use crate::types::{
    AnswerCommitment, CombinedSecret, EncryptedMasterKey, IdentityHash, MasterKey, SetupParams,
    ANSWER_SLOTS,
};

/// Hash the normalized username into an opaque identity.
pub fn identity_hash(username: &str) -> Result<IdentityHash, SetupError> {
    let field = to_field(username)?;
    Ok(IdentityHash(h_tag(TAG_IDENTITY, &[&field])))
}

/// Index-derived salt. Domain separation across slots: identical answer
/// text placed in different slots yields different commitments, so a
/// commitment cannot be replayed into another slot.
fn slot_salt(slot: usize) -> [u8; 8] {
    le_bytes::<8>(slot as u128)
}

/// Commit one answer into the given slot:
/// `H("notary.answer", field(normalize(answer)), LE64(slot))`.
pub fn commit_answer(answer: &str, slot: usize) -> Result<AnswerCommitment, SetupError> {
    if slot >= ANSWER_SLOTS {
        return Err(SetupError::SlotOutOfRange {
            slot,
            max: ANSWER_SLOTS,
        });
    }
    let field = to_field(answer)?;
    let salt = slot_salt(slot);
    Ok(AnswerCommitment(h_tag(TAG_ANSWER, &[&field, &salt])))
}

/// Commit all three answers in slot order.
pub fn commit_answers(
    answers: &[&str; ANSWER_SLOTS],
) -> Result<[AnswerCommitment; ANSWER_SLOTS], SetupError> {
    Ok([
        commit_answer(answers[0], 0)?,
        commit_answer(answers[1], 1)?,
        commit_answer(answers[2], 2)?,
    ])
}

/// Fixed left-associative pairwise fold:
/// `H(TAG_FOLD, H(TAG_FOLD, c0, c1), c2)`.
///
/// Not commutative: submitting the correct answer *set* in the wrong slot
/// order produces a different secret and fails reconstruction.
#[must_use]
pub fn fold_commitments(commitments: &[AnswerCommitment; ANSWER_SLOTS]) -> CombinedSecret {
    let left = h_tag(TAG_FOLD, &[&commitments[0].0, &commitments[1].0]);
    CombinedSecret(h_tag(TAG_FOLD, &[&left, &commitments[2].0]))
}

fn xor_mask(a: &Hash256, b: &Hash256) -> Hash256 {
    let mut out = [0u8; 32];
    for (o, (x, y)) in out.iter_mut().zip(a.iter().zip(b.iter())) {
        *o = x ^ y;
    }
    out
}

/// Mask the master key with the combined secret (one-time pad).
///
/// Confidentiality rests entirely on the combined secret being
/// unguessable and used for exactly one key.
#[must_use]
pub fn encrypt_master_key(key: &MasterKey, secret: &CombinedSecret) -> EncryptedMasterKey {
    EncryptedMasterKey(xor_mask(&key.0, &secret.0))
}

/// Unmask the master key. XOR is self-inverse:
/// `decrypt(encrypt(k, m), m) == k` for all `k`, `m`.
#[must_use]
pub fn decrypt_master_key(
    encrypted: &EncryptedMasterKey,
    secret: &CombinedSecret,
) -> MasterKey {
    MasterKey(xor_mask(&encrypted.0, &secret.0))
}

/// Full setup pipeline: canonicalize and commit each answer, fold, mask
/// the master key, and emit the public parameters for the ledger record
/// constructor. Pure; nothing is persisted here.
pub fn build_setup(
    username: &str,
    answers: &[&str; ANSWER_SLOTS],
    master_key: &MasterKey,
    engagement_secs: u64,
) -> Result<SetupParams, SetupError> {
    let identity = identity_hash(username)?;
    let commitments = commit_answers(answers)?;
    let secret = fold_commitments(&commitments);
    let encrypted_key = encrypt_master_key(master_key, &secret);
    Ok(SetupParams {
        identity,
        commitments,
        encrypted_key,
        engagement_secs,
    })
}
