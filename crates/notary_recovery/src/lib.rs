#![forbid(unsafe_code)]
#![deny(warnings, clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

//! Notary recovery core — protects a master key behind three knowledge
//! factors and a proof-of-engagement delay.
//!
//! Setup is pure and offline: answers are canonicalized, committed per
//! slot with the slot index as salt, folded left-associatively into a
//! combined secret, and the master key is XOR-masked with that secret.
//! Only the commitments and the masked key are ever persisted.
//!
//! Recovery is a per-identity state machine gated by an attempt budget
//! and a minimum elapsed-time proof, driven through an external atomic
//! record ledger (see [`ledger::RecoveryLedger`]).

pub mod codec;
pub mod commitment;
pub mod errors;
pub mod ledger;
pub mod session;
pub mod types;

pub use commitment::{
    build_setup, commit_answer, commit_answers, decrypt_master_key, encrypt_master_key,
    fold_commitments, identity_hash,
};
pub use errors::{RecoveryError, SetupError};
pub use ledger::{LedgerError, RecoveryLedger};
pub use session::{attempt_recovery, remaining_attempts, start_recovery};
pub use types::{
    AnswerCommitment, CombinedSecret, EncryptedMasterKey, IdentityHash, MasterKey, Phase,
    PublicProfile, Record, RecoverySession, SetupParams, ANSWER_SLOTS, MAX_RECOVERY_ATTEMPTS,
};

/// Protocol version, sealed into the canonical record encoding.
pub const NOTARY_PROTOCOL_VERSION: u32 = 1;
