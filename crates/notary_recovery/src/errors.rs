use notary_primitives::canonical::CanonicalError;
use thiserror::Error;

/// Setup-phase failures. Setup is pure and offline; any error here aborts
/// before a record is persisted, so no partial record is ever written.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SetupError {
    #[error("canonicalization failed: {0}")]
    Canonical(#[from] CanonicalError),

    #[error("slot out of range: {slot} not in [0, {max})")]
    SlotOutOfRange { slot: usize, max: usize },
}

/// Session-phase failures. Never reveals which answer slot(s) failed —
/// only the category — to deny a per-factor guessing oracle.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryError {
    #[error("unknown or mismatched identity")]
    InvalidIdentity,

    #[error("recovery session has not been started")]
    SessionNotStarted,

    #[error("recovery session already resolved")]
    SessionAlreadyResolved,

    #[error("engagement period not elapsed: {elapsed}s of {required}s")]
    EngagementPeriodNotElapsed { required: u64, elapsed: u64 },

    #[error("attempt budget exhausted")]
    AttemptsExhausted,

    #[error("submitted answers do not match")]
    AnswerMismatch,

    #[error("concurrent ledger transaction conflict")]
    LedgerConflict,
}
