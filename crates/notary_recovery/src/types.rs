//! Data model: fixed-width scalars, the persisted record, and session
//! state. Fixed-size newtypes prevent cross-purpose misuse of raw hashes.

use core::fmt;
use notary_primitives::{ct_eq_hash, Hash256};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Number of question slots committed at setup.
pub const ANSWER_SLOTS: usize = 3;

/// Attempt budget granted at setup. Monotonically non-increasing; once it
/// reaches zero the record is locked permanently.
pub const MAX_RECOVERY_ATTEMPTS: u8 = 3;

/// Opaque hash of the normalized username. Immutable once set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdentityHash(pub Hash256);

/// Salted commitment to one normalized answer. Slot order is significant;
/// write-once after setup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnswerCommitment(pub Hash256);

/// Fold of the three answer commitments. Never persisted; recomputed
/// transiently during a successful reconstruction.
#[derive(Clone, Copy)]
pub struct CombinedSecret(pub Hash256);

/// The master key XOR-masked with the combined secret — the only
/// persisted form of the secret. Write-once after setup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncryptedMasterKey(pub Hash256);

/// The protected secret. Zeroized on drop, compared in constant time,
/// and redacted from debug output.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey(pub Hash256);

impl PartialEq for MasterKey {
    fn eq(&self, other: &Self) -> bool {
        ct_eq_hash(&self.0, &other.0)
    }
}

impl Eq for MasterKey {}

// Key material stays out of debug output.
#[allow(clippy::missing_fields_in_debug)]
impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey(..)")
    }
}

/// Recovery session phase. `Locked` and `Resolved` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Phase {
    NotStarted = 0,
    Started = 1,
    Locked = 2,
    Resolved = 3,
}

/// Mutable per-identity session state. The only part of a [`Record`]
/// that changes after setup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecoverySession {
    pub phase: Phase,
    /// Engagement timer origin (ledger clock seconds). Zero until the
    /// first `start_recovery`.
    pub started_at: u64,
    pub attempts_remaining: u8,
}

/// Write-once setup half of a record: the public parameters produced by
/// the commitment builder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SetupParams {
    pub identity: IdentityHash,
    pub commitments: [AnswerCommitment; ANSWER_SLOTS],
    pub encrypted_key: EncryptedMasterKey,
    pub engagement_secs: u64,
}

/// The persisted aggregate, one per identity. Created once at setup,
/// mutated only through the session state machine, never deleted by the
/// core.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Record {
    pub params: SetupParams,
    pub session: RecoverySession,
}

impl Record {
    /// Fresh record with a full attempt budget and no session started.
    #[must_use]
    pub const fn new(params: SetupParams) -> Self {
        Self {
            params,
            session: RecoverySession {
                phase: Phase::NotStarted,
                started_at: 0,
                attempts_remaining: MAX_RECOVERY_ATTEMPTS,
            },
        }
    }
}

/// Non-secret display mirror for clients. Carries only the identity hash
/// and the engagement duration — never answers or key material.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicProfile {
    pub identity: IdentityHash,
    pub engagement_secs: u64,
}

impl From<&Record> for PublicProfile {
    fn from(record: &Record) -> Self {
        Self {
            identity: record.params.identity,
            engagement_secs: record.params.engagement_secs,
        }
    }
}
