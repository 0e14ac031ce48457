//! Verification record reconciliation.
//!
//! Record lifecycle per `(user_id, method)`:
//!
//! ```text
//! NoRecord --approved--> Verified
//! NoRecord --declined--> Failed
//! Verified <--approved/declined--> Failed   (last write wins)
//! ```
//!
//! "In review" only flags the profile; other pending statuses change
//! nothing here. Each step is isolated: a failure is logged and reported,
//! and the remaining steps still run.

use std::sync::Arc;

use idv_store::{IdvStore, StoreError};
use idv_types::{
    CanonicalStatus, Clock, PendingKind, ProfileChange, Provider, ProviderSessionId,
    RecordStatus, Timestamp, UserId, VerificationMethod, VerificationRecord,
};

const DEFAULT_DECLINE_REASON: &str = "Declined";

/// What a single reconciliation changed, and what failed along the way.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Status written to the verification record, if any.
    pub record: Option<RecordStatus>,
    pub profile_updated: bool,
    pub failures: Vec<String>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Clone)]
pub struct RecordReconciler {
    store: Arc<dyn IdvStore>,
    clock: Arc<dyn Clock>,
    method: VerificationMethod,
}

impl RecordReconciler {
    pub fn new(store: Arc<dyn IdvStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            method: VerificationMethod::IdDocument,
        }
    }

    pub fn reconcile(
        &self,
        provider: Provider,
        session_id: &ProviderSessionId,
        user_id: &UserId,
        status: CanonicalStatus,
        detail: Option<&str>,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let now = self.clock.now();

        match status {
            CanonicalStatus::Approved => {
                let notes = format!(
                    "Auto-verified via {}. Session: {session_id}",
                    provider.display_name()
                );
                self.record_step(
                    &mut report,
                    user_id,
                    RecordStatus::Verified,
                    None,
                    notes,
                    now,
                );
                self.profile_step(&mut report, user_id, ProfileChange::approved(self.method, now));
            }
            CanonicalStatus::Declined => {
                let reason = detail.unwrap_or(DEFAULT_DECLINE_REASON).to_string();
                let notes = format!(
                    "Auto-failed via {}. Session: {session_id}",
                    provider.display_name()
                );
                self.record_step(
                    &mut report,
                    user_id,
                    RecordStatus::Failed,
                    Some(reason),
                    notes,
                    now,
                );
            }
            CanonicalStatus::Pending(PendingKind::InReview) => {
                self.profile_step(&mut report, user_id, ProfileChange::in_review());
            }
            CanonicalStatus::Pending(PendingKind::Other) => {}
        }

        report
    }

    fn record_step(
        &self,
        report: &mut ReconcileReport,
        user_id: &UserId,
        status: RecordStatus,
        rejection_reason: Option<String>,
        reviewer_notes: String,
        now: Timestamp,
    ) {
        match self.write_record(user_id, status, rejection_reason, reviewer_notes, now) {
            Ok(()) => {
                tracing::info!(user = %user_id, status = status.as_str(), "verification record written");
                report.record = Some(status);
            }
            Err(e) => {
                tracing::error!(user = %user_id, error = %e, "verification record write failed");
                report.failures.push(format!("record: {e}"));
            }
        }
    }

    fn profile_step(&self, report: &mut ReconcileReport, user_id: &UserId, change: ProfileChange) {
        match self.store.update_profile(user_id, &change) {
            Ok(_) => report.profile_updated = true,
            Err(e) => {
                tracing::error!(user = %user_id, error = %e, "profile update failed");
                report.failures.push(format!("profile: {e}"));
            }
        }
    }

    /// Find-then-write. A losing concurrent insert sees `Duplicate` and
    /// falls back to updating the winner's row.
    fn write_record(
        &self,
        user_id: &UserId,
        status: RecordStatus,
        rejection_reason: Option<String>,
        reviewer_notes: String,
        now: Timestamp,
    ) -> Result<(), StoreError> {
        let apply = |mut record: VerificationRecord| {
            record.status = status;
            record.rejection_reason = rejection_reason.clone();
            record.reviewed_at = Some(now);
            record.reviewer_notes = reviewer_notes.clone();
            record
        };

        if let Some(existing) = self.store.find_record(user_id, self.method)? {
            return self.store.update_record(&apply(existing));
        }

        let fresh = apply(VerificationRecord::pending(user_id.clone(), self.method));
        match self.store.insert_record(&fresh) {
            Err(StoreError::Duplicate(_)) => {
                tracing::debug!(user = %user_id, "lost record insert race, updating instead");
                let winner = self
                    .store
                    .find_record(user_id, self.method)?
                    .ok_or_else(|| StoreError::NotFound(format!("{user_id}/{}", self.method)))?;
                self.store.update_record(&apply(winner))
            }
            other => other,
        }
    }
}
