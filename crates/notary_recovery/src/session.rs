//! Recovery session state machine.
//!
//! `NotStarted → Started → {Resolved | Started (wrong, attempts remain) |
//! Locked (wrong, attempts exhausted)}`; `Resolved` and `Locked` are
//! terminal. Every check-then-act sequence runs inside one ledger
//! transaction, so concurrent calls for the same identity serialize on
//! the ledger and the attempt budget cannot be double-spent.

use notary_primitives::ct_eq_hash;
use tracing::{debug, info, warn};

use crate::commitment::{decrypt_master_key, fold_commitments};
use crate::errors::RecoveryError;
use crate::ledger::RecoveryLedger;
use crate::types::{AnswerCommitment, IdentityHash, MasterKey, Phase, Record, ANSWER_SLOTS};

enum AttemptOutcome {
    Recovered(MasterKey),
    Mismatch,
}

fn verify_identity(record: &Record, identity: &IdentityHash) -> Result<(), RecoveryError> {
    if ct_eq_hash(&record.params.identity.0, &identity.0) {
        Ok(())
    } else {
        Err(RecoveryError::InvalidIdentity)
    }
}

/// Start (or restart) a recovery session.
///
/// Restarting while already `Started` overwrites the prior timer origin —
/// intentional, since the caller may need to re-engage before retrying.
pub fn start_recovery<L: RecoveryLedger>(
    ledger: &L,
    identity: &IdentityHash,
) -> Result<(), RecoveryError> {
    let now = ledger.now_unix();
    ledger.write_atomic(identity, |record| {
        verify_identity(record, identity)?;
        match record.session.phase {
            Phase::Resolved => Err(RecoveryError::SessionAlreadyResolved),
            Phase::Locked => Err(RecoveryError::AttemptsExhausted),
            Phase::NotStarted | Phase::Started => {
                debug_assert!(record.session.attempts_remaining > 0);
                record.session.phase = Phase::Started;
                record.session.started_at = now;
                debug!(started_at = now, "recovery session started");
                Ok(())
            }
        }
    })
}

/// Submit the three answer commitments, in slot order.
///
/// The engagement gate is inclusive (`elapsed == engagement_secs`
/// passes) and a timing failure consumes no attempt and mutates nothing.
/// Comparison is all-or-nothing: every slot is checked in constant time
/// with no early exit, and a mismatch reports no per-slot detail. On a
/// mismatch the engagement timer restarts, so the caller waits through
/// the full period again before the next attempt.
pub fn attempt_recovery<L: RecoveryLedger>(
    ledger: &L,
    identity: &IdentityHash,
    submitted: &[AnswerCommitment; ANSWER_SLOTS],
) -> Result<MasterKey, RecoveryError> {
    let now = ledger.now_unix();
    let outcome = ledger.write_atomic(identity, |record| {
        verify_identity(record, identity)?;
        match record.session.phase {
            Phase::NotStarted => return Err(RecoveryError::SessionNotStarted),
            Phase::Resolved => return Err(RecoveryError::SessionAlreadyResolved),
            Phase::Locked => return Err(RecoveryError::AttemptsExhausted),
            Phase::Started => {}
        }

        let required = record.params.engagement_secs;
        let elapsed = now.saturating_sub(record.session.started_at);
        if elapsed < required {
            return Err(RecoveryError::EngagementPeriodNotElapsed { required, elapsed });
        }

        // Non-short-circuit: every slot is compared regardless of the
        // outcome of earlier slots.
        let mut matched = true;
        for (sub, stored) in submitted.iter().zip(&record.params.commitments) {
            matched &= ct_eq_hash(&sub.0, &stored.0);
        }

        if matched {
            // The ledger stores the committed hashes, so the mask is
            // folded from the submitted hashes — identical by equality.
            let secret = fold_commitments(submitted);
            let key = decrypt_master_key(&record.params.encrypted_key, &secret);
            record.session.phase = Phase::Resolved;
            info!("master key reconstructed; session resolved");
            Ok(AttemptOutcome::Recovered(key))
        } else {
            record.session.attempts_remaining -= 1;
            if record.session.attempts_remaining == 0 {
                record.session.phase = Phase::Locked;
                warn!("attempt budget exhausted; record locked permanently");
            } else {
                record.session.phase = Phase::Started;
                record.session.started_at = now;
                debug!(
                    attempts_remaining = record.session.attempts_remaining,
                    "answer mismatch; engagement timer restarted"
                );
            }
            Ok(AttemptOutcome::Mismatch)
        }
    })?;

    match outcome {
        AttemptOutcome::Recovered(key) => Ok(key),
        AttemptOutcome::Mismatch => Err(RecoveryError::AnswerMismatch),
    }
}

/// Read-only view of the remaining attempt budget.
pub fn remaining_attempts<L: RecoveryLedger>(
    ledger: &L,
    identity: &IdentityHash,
) -> Result<u8, RecoveryError> {
    let record = ledger.read(identity)?;
    verify_identity(&record, identity)?;
    Ok(record.session.attempts_remaining)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commitment::{build_setup, commit_answers};
    use crate::ledger::LedgerError;
    use crate::types::MAX_RECOVERY_ATTEMPTS;
    use core::cell::{Cell, RefCell};

    const ANSWERS: [&str; ANSWER_SLOTS] = ["Denis Guedj", "2012", "Finney"];
    const ENGAGEMENT_SECS: u64 = 218;

    /// Single-record ledger with a manual clock. `write_atomic` stages
    /// mutations on a copy and commits only on `Ok`.
    struct TestLedger {
        record: RefCell<Record>,
        now: Cell<u64>,
    }

    impl TestLedger {
        fn new(record: Record, now: u64) -> Self {
            Self {
                record: RefCell::new(record),
                now: Cell::new(now),
            }
        }

        fn advance(&self, secs: u64) {
            self.now.set(self.now.get() + secs);
        }

        fn phase(&self) -> Phase {
            self.record.borrow().session.phase
        }
    }

    impl RecoveryLedger for TestLedger {
        fn read(&self, _identity: &IdentityHash) -> Result<Record, LedgerError> {
            Ok(*self.record.borrow())
        }

        fn write_atomic<T>(
            &self,
            _identity: &IdentityHash,
            mutate: impl FnOnce(&mut Record) -> Result<T, RecoveryError>,
        ) -> Result<T, RecoveryError> {
            let mut staged = *self.record.borrow();
            let out = mutate(&mut staged)?;
            *self.record.borrow_mut() = staged;
            Ok(out)
        }

        fn now_unix(&self) -> u64 {
            self.now.get()
        }
    }

    fn provisioned() -> (TestLedger, IdentityHash, MasterKey) {
        let key = MasterKey([0x42; 32]);
        let params = build_setup("alice", &ANSWERS, &key, ENGAGEMENT_SECS).unwrap();
        let identity = params.identity;
        (TestLedger::new(Record::new(params), 1_000), identity, key)
    }

    fn correct() -> [AnswerCommitment; ANSWER_SLOTS] {
        commit_answers(&ANSWERS).unwrap()
    }

    fn wrong() -> [AnswerCommitment; ANSWER_SLOTS] {
        commit_answers(&["nope", "1999", "szabo"]).unwrap()
    }

    #[test]
    fn attempt_before_start_fails() {
        let (ledger, identity, _key) = provisioned();
        assert!(matches!(
            attempt_recovery(&ledger, &identity, &correct()),
            Err(RecoveryError::SessionNotStarted)
        ));
        assert_eq!(ledger.phase(), Phase::NotStarted);
    }

    #[test]
    fn engagement_gate_boundary_is_inclusive() {
        let (ledger, identity, key) = provisioned();
        start_recovery(&ledger, &identity).unwrap();

        ledger.advance(ENGAGEMENT_SECS - 1);
        assert!(matches!(
            attempt_recovery(&ledger, &identity, &correct()),
            Err(RecoveryError::EngagementPeriodNotElapsed {
                required: ENGAGEMENT_SECS,
                elapsed: 217,
            })
        ));
        // A timing failure consumes no attempt.
        assert_eq!(
            remaining_attempts(&ledger, &identity).unwrap(),
            MAX_RECOVERY_ATTEMPTS
        );

        ledger.advance(1);
        assert_eq!(attempt_recovery(&ledger, &identity, &correct()).unwrap(), key);
        assert_eq!(ledger.phase(), Phase::Resolved);
    }

    #[test]
    fn mismatch_decrements_and_restarts_timer() {
        let (ledger, identity, _key) = provisioned();
        start_recovery(&ledger, &identity).unwrap();
        ledger.advance(ENGAGEMENT_SECS);

        assert!(matches!(
            attempt_recovery(&ledger, &identity, &wrong()),
            Err(RecoveryError::AnswerMismatch)
        ));
        assert_eq!(
            remaining_attempts(&ledger, &identity).unwrap(),
            MAX_RECOVERY_ATTEMPTS - 1
        );
        assert_eq!(ledger.phase(), Phase::Started);

        // The timer restarted: an immediate retry hits the gate again.
        assert!(matches!(
            attempt_recovery(&ledger, &identity, &correct()),
            Err(RecoveryError::EngagementPeriodNotElapsed { .. })
        ));
    }

    #[test]
    fn correct_set_in_wrong_order_is_a_mismatch() {
        let (ledger, identity, _key) = provisioned();
        start_recovery(&ledger, &identity).unwrap();
        ledger.advance(ENGAGEMENT_SECS);

        let shuffled = commit_answers(&["2012", "Denis Guedj", "Finney"]).unwrap();
        assert!(matches!(
            attempt_recovery(&ledger, &identity, &shuffled),
            Err(RecoveryError::AnswerMismatch)
        ));
        assert_eq!(
            remaining_attempts(&ledger, &identity).unwrap(),
            MAX_RECOVERY_ATTEMPTS - 1
        );
    }

    #[test]
    fn lockout_is_permanent() {
        let (ledger, identity, _key) = provisioned();
        start_recovery(&ledger, &identity).unwrap();

        for _ in 0..MAX_RECOVERY_ATTEMPTS {
            ledger.advance(ENGAGEMENT_SECS);
            assert!(matches!(
                attempt_recovery(&ledger, &identity, &wrong()),
                Err(RecoveryError::AnswerMismatch)
            ));
        }
        assert_eq!(ledger.phase(), Phase::Locked);
        assert_eq!(remaining_attempts(&ledger, &identity).unwrap(), 0);

        // Even fully correct answers are refused once locked.
        ledger.advance(ENGAGEMENT_SECS);
        assert!(matches!(
            attempt_recovery(&ledger, &identity, &correct()),
            Err(RecoveryError::AttemptsExhausted)
        ));
        assert!(matches!(
            start_recovery(&ledger, &identity),
            Err(RecoveryError::AttemptsExhausted)
        ));
        assert_eq!(remaining_attempts(&ledger, &identity).unwrap(), 0);
    }

    #[test]
    fn resolved_session_is_terminal() {
        let (ledger, identity, key) = provisioned();
        start_recovery(&ledger, &identity).unwrap();
        ledger.advance(ENGAGEMENT_SECS);
        assert_eq!(attempt_recovery(&ledger, &identity, &correct()).unwrap(), key);

        assert!(matches!(
            attempt_recovery(&ledger, &identity, &correct()),
            Err(RecoveryError::SessionAlreadyResolved)
        ));
        assert!(matches!(
            start_recovery(&ledger, &identity),
            Err(RecoveryError::SessionAlreadyResolved)
        ));
    }

    #[test]
    fn restart_overwrites_the_timer() {
        let (ledger, identity, key) = provisioned();
        start_recovery(&ledger, &identity).unwrap();
        ledger.advance(100);

        // Restarting resets the origin; the old 100 seconds no longer count.
        start_recovery(&ledger, &identity).unwrap();
        ledger.advance(ENGAGEMENT_SECS - 1);
        assert!(matches!(
            attempt_recovery(&ledger, &identity, &correct()),
            Err(RecoveryError::EngagementPeriodNotElapsed { .. })
        ));
        ledger.advance(1);
        assert_eq!(attempt_recovery(&ledger, &identity, &correct()).unwrap(), key);
    }

    #[test]
    fn mismatched_identity_is_rejected() {
        let (ledger, _identity, _key) = provisioned();
        let other = IdentityHash([0xEE; 32]);
        assert!(matches!(
            start_recovery(&ledger, &other),
            Err(RecoveryError::InvalidIdentity)
        ));
        assert!(matches!(
            remaining_attempts(&ledger, &other),
            Err(RecoveryError::InvalidIdentity)
        ));
    }
}
