//! Canonical record codec for ledger persistence and transport.
//! Order is fixed, lengths are exact, no trailing bytes; a protocol
//! version word leads the encoding.

use notary_primitives::{le_bytes, Hash256};
use thiserror::Error;

use crate::types::{
    AnswerCommitment, EncryptedMasterKey, IdentityHash, Phase, Record, RecoverySession,
    SetupParams, ANSWER_SLOTS,
};
use crate::NOTARY_PROTOCOL_VERSION;

/// Exact byte length of an encoded record:
/// version(4) || identity(32) || commitments(96) || masked key(32) ||
/// engagement(8) || phase(1) || timer origin(8) || attempts(1).
pub const ENCODED_RECORD_LEN: usize = 4 + 32 + 32 * ANSWER_SLOTS + 32 + 8 + 1 + 8 + 1;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    #[error("short input")]
    Short,

    #[error("trailing bytes")]
    Trailing,

    #[error("unknown phase byte: {0}")]
    BadPhase(u8),

    #[error("protocol version mismatch: expected {expected} got {got}")]
    Version { expected: u32, got: u32 },
}

const fn read_exact<'a>(src: &mut &'a [u8], n: usize) -> Result<&'a [u8], CodecError> {
    if src.len() < n {
        return Err(CodecError::Short);
    }
    let (a, b) = src.split_at(n);
    *src = b;
    Ok(a)
}

fn read_hash(src: &mut &[u8]) -> Result<Hash256, CodecError> {
    let bytes = read_exact(src, 32)?;
    let mut out = [0u8; 32];
    out.copy_from_slice(bytes);
    Ok(out)
}

fn read_u64(src: &mut &[u8]) -> Result<u64, CodecError> {
    Ok(u64::from_le_bytes(read_exact(src, 8)?.try_into().unwrap()))
}

#[must_use]
pub fn encode_record(record: &Record) -> Vec<u8> {
    let mut out = Vec::with_capacity(ENCODED_RECORD_LEN);
    out.extend_from_slice(&le_bytes::<4>(u128::from(NOTARY_PROTOCOL_VERSION)));
    out.extend_from_slice(&record.params.identity.0);
    for commitment in &record.params.commitments {
        out.extend_from_slice(&commitment.0);
    }
    out.extend_from_slice(&record.params.encrypted_key.0);
    out.extend_from_slice(&le_bytes::<8>(u128::from(record.params.engagement_secs)));
    out.push(record.session.phase as u8);
    out.extend_from_slice(&le_bytes::<8>(u128::from(record.session.started_at)));
    out.push(record.session.attempts_remaining);
    out
}

pub fn decode_record(mut src: &[u8]) -> Result<Record, CodecError> {
    let got = u32::from_le_bytes(read_exact(&mut src, 4)?.try_into().unwrap());
    if got != NOTARY_PROTOCOL_VERSION {
        return Err(CodecError::Version {
            expected: NOTARY_PROTOCOL_VERSION,
            got,
        });
    }
    let identity = IdentityHash(read_hash(&mut src)?);
    let commitments = [
        AnswerCommitment(read_hash(&mut src)?),
        AnswerCommitment(read_hash(&mut src)?),
        AnswerCommitment(read_hash(&mut src)?),
    ];
    let encrypted_key = EncryptedMasterKey(read_hash(&mut src)?);
    let engagement_secs = read_u64(&mut src)?;
    let phase = match read_exact(&mut src, 1)?[0] {
        0 => Phase::NotStarted,
        1 => Phase::Started,
        2 => Phase::Locked,
        3 => Phase::Resolved,
        other => return Err(CodecError::BadPhase(other)),
    };
    let started_at = read_u64(&mut src)?;
    let attempts_remaining = read_exact(&mut src, 1)?[0];
    if !src.is_empty() {
        return Err(CodecError::Trailing);
    }
    Ok(Record {
        params: SetupParams {
            identity,
            commitments,
            encrypted_key,
            engagement_secs,
        },
        session: RecoverySession {
            phase,
            started_at,
            attempts_remaining,
        },
    })
}
