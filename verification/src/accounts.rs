//! Account-side state the workflow depends on but does not own: the profile
//! that approvals activate, the devices that receive outcome pushes, and
//! direct-message thread membership.

use std::sync::Arc;

use idv_store::{IdvStore, StoreError};
use idv_types::{ProfileChange, ThreadId, UserId, UserProfile};

use crate::VerificationError;

#[derive(Clone)]
pub struct AccountDirectory {
    store: Arc<dyn IdvStore>,
}

impl AccountDirectory {
    pub fn new(store: Arc<dyn IdvStore>) -> Self {
        Self { store }
    }

    /// Create an unverified, inactive profile if the user has none.
    ///
    /// Returns whether one was created; an existing profile is left as is.
    pub fn ensure_profile(&self, user_id: &UserId) -> Result<bool, VerificationError> {
        let created = self.store.create_profile(&UserProfile::new(user_id.clone()))?;
        if created {
            tracing::info!(user = %user_id, "profile provisioned");
        }
        Ok(created)
    }

    /// Ensure the profile exists, then apply public naming.
    pub fn provision(
        &self,
        user_id: &UserId,
        names: ProfileChange,
    ) -> Result<UserProfile, VerificationError> {
        self.ensure_profile(user_id)?;
        if !names.is_empty() {
            return Ok(self.store.update_profile(user_id, &names)?);
        }
        self.store
            .get_profile(user_id)?
            .ok_or_else(|| StoreError::NotFound(format!("profile {user_id}")).into())
    }

    pub fn register_device(&self, user_id: &UserId, token: &str) -> Result<(), VerificationError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(VerificationError::MissingFields);
        }
        self.store.register_token(user_id, token)?;
        tracing::debug!(user = %user_id, "device token registered");
        Ok(())
    }

    pub fn remove_device(&self, user_id: &UserId, token: &str) -> Result<(), VerificationError> {
        self.store.remove_token(user_id, token.trim())?;
        Ok(())
    }

    /// Record every member of a direct-message thread.
    pub fn join_thread(
        &self,
        thread_id: &ThreadId,
        members: &[UserId],
    ) -> Result<(), VerificationError> {
        for member in members {
            self.store.add_participant(thread_id, member)?;
        }
        tracing::debug!(thread = %thread_id, members = members.len(), "thread membership recorded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idv_nullables::NullStore;
    use idv_store::{DeviceTokenStore, ProfileStore, ThreadStore};
    use idv_types::{HumanVerification, Timestamp, VerificationMethod};

    fn setup() -> (Arc<NullStore>, AccountDirectory) {
        let store = Arc::new(NullStore::new());
        (store.clone(), AccountDirectory::new(store))
    }

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    #[test]
    fn ensure_profile_is_idempotent_and_keeps_verification() {
        let (store, accounts) = setup();
        assert!(accounts.ensure_profile(&uid("u1")).unwrap());
        store
            .update_profile(
                &uid("u1"),
                &ProfileChange::approved(VerificationMethod::IdDocument, Timestamp::new(5)),
            )
            .unwrap();

        assert!(!accounts.ensure_profile(&uid("u1")).unwrap());
        let profile = store.get_profile(&uid("u1")).unwrap().unwrap();
        assert_eq!(profile.verified_human, HumanVerification::Verified);
    }

    #[test]
    fn provision_applies_names() {
        let (_, accounts) = setup();
        let profile = accounts
            .provision(&uid("u1"), ProfileChange::names(Some("Ada".into()), Some("ada".into())))
            .unwrap();
        assert_eq!(profile.display_name.as_deref(), Some("Ada"));
        assert_eq!(profile.verified_human, HumanVerification::Unverified);

        let unchanged = accounts.provision(&uid("u1"), ProfileChange::default()).unwrap();
        assert_eq!(unchanged.username.as_deref(), Some("ada"));
    }

    #[test]
    fn blank_device_token_is_rejected() {
        let (store, accounts) = setup();
        assert!(matches!(
            accounts.register_device(&uid("u1"), "  "),
            Err(VerificationError::MissingFields)
        ));
        accounts.register_device(&uid("u1"), " tok ").unwrap();
        assert_eq!(store.tokens_for(&uid("u1")).unwrap(), vec!["tok"]);
        accounts.remove_device(&uid("u1"), "tok").unwrap();
        assert!(store.tokens_for(&uid("u1")).unwrap().is_empty());
    }

    #[test]
    fn join_thread_records_members() {
        let (store, accounts) = setup();
        let thread = ThreadId::new("t1").unwrap();
        accounts.join_thread(&thread, &[uid("a"), uid("b")]).unwrap();
        assert_eq!(store.participants(&thread).unwrap().len(), 2);
    }
}
