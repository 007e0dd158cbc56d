#![forbid(unsafe_code)]
#![deny(warnings, clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

//! End-to-end harness: an in-memory reference ledger with a manually
//! advanced clock, plus a provisioning helper. The mutex serializes
//! transactions per process, standing in for the real store's atomic
//! read-modify-write guarantee.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use notary_primitives::Hash256;
use notary_recovery::{
    build_setup, IdentityHash, LedgerError, MasterKey, Record, RecoveryError, RecoveryLedger,
    SetupError, ANSWER_SLOTS,
};

/// In-memory record store keyed by identity hash. The clock is manual so
/// tests can step through the engagement period deterministically; it
/// plays the role of the ledger's consensus clock authority.
pub struct MemoryLedger {
    records: Mutex<BTreeMap<Hash256, Record>>,
    clock: AtomicU64,
}

impl MemoryLedger {
    #[must_use]
    pub fn new(now_unix: u64) -> Self {
        Self {
            records: Mutex::new(BTreeMap::new()),
            clock: AtomicU64::new(now_unix),
        }
    }

    /// Persist a freshly provisioned record (the setup-time write).
    pub fn insert(&self, record: Record) {
        let mut records = self.records.lock().expect("ledger lock poisoned");
        records.insert(record.params.identity.0, record);
    }

    /// Advance the ledger clock.
    pub fn advance(&self, secs: u64) {
        self.clock.fetch_add(secs, Ordering::SeqCst);
    }
}

impl RecoveryLedger for MemoryLedger {
    fn read(&self, identity: &IdentityHash) -> Result<Record, LedgerError> {
        let records = self.records.lock().map_err(|_| LedgerError::Conflict)?;
        records.get(&identity.0).copied().ok_or(LedgerError::NotFound)
    }

    fn write_atomic<T>(
        &self,
        identity: &IdentityHash,
        mutate: impl FnOnce(&mut Record) -> Result<T, RecoveryError>,
    ) -> Result<T, RecoveryError> {
        let mut records = self.records.lock().map_err(|_| LedgerError::Conflict)?;
        let record = records.get_mut(&identity.0).ok_or(LedgerError::NotFound)?;
        // Stage on a copy; commit only when the mutator succeeds.
        let mut staged = *record;
        let out = mutate(&mut staged)?;
        *record = staged;
        Ok(out)
    }

    fn now_unix(&self) -> u64 {
        self.clock.load(Ordering::SeqCst)
    }
}

/// Run the full setup pipeline and persist the resulting record.
pub fn provision(
    ledger: &MemoryLedger,
    username: &str,
    answers: &[&str; ANSWER_SLOTS],
    master_key: &MasterKey,
    engagement_secs: u64,
) -> Result<IdentityHash, SetupError> {
    let params = build_setup(username, answers, master_key, engagement_secs)?;
    let identity = params.identity;
    ledger.insert(Record::new(params));
    Ok(identity)
}
