//! Verification record storage trait.

use crate::StoreError;
use idv_types::{UserId, VerificationMethod, VerificationRecord};

/// Current verification standing per `(user_id, method)`.
///
/// Writers use find-then-write. Backends key rows by the pair, so a second
/// concurrent insert fails with [`StoreError::Duplicate`] instead of
/// creating a duplicate row.
pub trait VerificationRecordStore {
    /// Find the record for a user and method.
    fn find_record(
        &self,
        user_id: &UserId,
        method: VerificationMethod,
    ) -> Result<Option<VerificationRecord>, StoreError>;

    /// Insert a new record. Fails with `Duplicate` if one already exists.
    fn insert_record(&self, record: &VerificationRecord) -> Result<(), StoreError>;

    /// Overwrite an existing record. Fails with `NotFound` if there is none.
    fn update_record(&self, record: &VerificationRecord) -> Result<(), StoreError>;

    /// All records for a user, across methods.
    fn records_for_user(&self, user_id: &UserId) -> Result<Vec<VerificationRecord>, StoreError>;
}
