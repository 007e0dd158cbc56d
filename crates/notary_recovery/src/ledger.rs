//! Ledger interface: the external atomic record store and clock authority
//! the session state machine runs against. The core assumes the contract
//! below and implements no storage or consensus itself.

use thiserror::Error;

use crate::errors::RecoveryError;
use crate::types::{IdentityHash, Record};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LedgerError {
    #[error("no record for identity")]
    NotFound,

    #[error("atomic transaction conflict")]
    Conflict,
}

impl From<LedgerError> for RecoveryError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound => Self::InvalidIdentity,
            LedgerError::Conflict => Self::LedgerConflict,
        }
    }
}

/// Atomic, per-identity record store plus the protocol clock.
///
/// `write_atomic` must apply the mutator to the current record as a
/// single read-modify-write transaction with no interleaving from other
/// callers for the same identity; when the mutator returns `Err`, the
/// record must be left unchanged. A conflict is surfaced to the caller —
/// the state machine never retries on its own, since replaying an
/// attempt could double-consume the budget.
///
/// `now_unix` is the ledger's own clock authority. The engagement proof
/// compares against this clock only, never a locally read wall clock, so
/// clients cannot bypass the delay by skewing their time.
pub trait RecoveryLedger {
    fn read(&self, identity: &IdentityHash) -> Result<Record, LedgerError>;

    fn write_atomic<T>(
        &self,
        identity: &IdentityHash,
        mutate: impl FnOnce(&mut Record) -> Result<T, RecoveryError>,
    ) -> Result<T, RecoveryError>;

    fn now_unix(&self) -> u64;
}
