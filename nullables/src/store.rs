//! Nullable store: thread-safe in-memory storage for testing.

use idv_store::{
    DeviceTokenStore, ProfileStore, SessionStore, StoreError, ThreadStore,
    VerificationRecordStore,
};
use idv_types::{
    ProfileChange, Provider, ProviderSessionId, SessionUpdate, ThreadId, Timestamp, UserId,
    UserProfile, VerificationMethod, VerificationRecord, VerificationSession,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

/// An in-memory implementation of every store trait.
/// Thread-safe for use with tokio's multi-threaded runtime.
///
/// Honors the same key constraints as the LMDB backend, counts successful
/// writes, and can be told to fail writes or to miss a record on the next
/// lookup (to simulate a concurrent insert).
pub struct NullStore {
    sessions: Mutex<HashMap<(Provider, String), VerificationSession>>,
    records: Mutex<BTreeMap<(String, VerificationMethod), VerificationRecord>>,
    profiles: Mutex<HashMap<String, UserProfile>>,
    tokens: Mutex<BTreeMap<String, Vec<String>>>,
    threads: Mutex<BTreeMap<String, BTreeSet<String>>>,
    writes: AtomicU64,
    fail_writes: AtomicBool,
    hide_next_find: AtomicBool,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            records: Mutex::new(BTreeMap::new()),
            profiles: Mutex::new(HashMap::new()),
            tokens: Mutex::new(BTreeMap::new()),
            threads: Mutex::new(BTreeMap::new()),
            writes: AtomicU64::new(0),
            fail_writes: AtomicBool::new(false),
            hide_next_find: AtomicBool::new(false),
        }
    }

    /// Number of successful writes across all tables.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every subsequent write fail with a backend error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// The next `find_record` reports no record even if one exists.
    pub fn hide_records_from_next_find(&self) {
        self.hide_next_find.store(true, Ordering::SeqCst);
    }

    fn begin_write(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("null store set to fail writes".into()));
        }
        Ok(())
    }

    fn wrote(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for NullStore {
    fn upsert_session(
        &self,
        update: &SessionUpdate,
        now: Timestamp,
    ) -> Result<VerificationSession, StoreError> {
        self.begin_write()?;
        let key = (update.provider, update.provider_session_id.to_string());
        let mut sessions = self.sessions.lock().unwrap();
        let session = VerificationSession::upsert(sessions.remove(&key), update, now);
        sessions.insert(key, session.clone());
        self.wrote();
        Ok(session)
    }

    fn get_session(
        &self,
        provider: Provider,
        id: &ProviderSessionId,
    ) -> Result<Option<VerificationSession>, StoreError> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .get(&(provider, id.to_string()))
            .cloned())
    }

    fn session_count(&self) -> Result<u64, StoreError> {
        Ok(self.sessions.lock().unwrap().len() as u64)
    }
}

impl VerificationRecordStore for NullStore {
    fn find_record(
        &self,
        user_id: &UserId,
        method: VerificationMethod,
    ) -> Result<Option<VerificationRecord>, StoreError> {
        if self.hide_next_find.swap(false, Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(&(user_id.to_string(), method))
            .cloned())
    }

    fn insert_record(&self, record: &VerificationRecord) -> Result<(), StoreError> {
        self.begin_write()?;
        let key = (record.user_id.to_string(), record.method);
        let mut records = self.records.lock().unwrap();
        if records.contains_key(&key) {
            return Err(StoreError::Duplicate(format!("{}/{}", key.0, key.1)));
        }
        records.insert(key, record.clone());
        self.wrote();
        Ok(())
    }

    fn update_record(&self, record: &VerificationRecord) -> Result<(), StoreError> {
        self.begin_write()?;
        let key = (record.user_id.to_string(), record.method);
        let mut records = self.records.lock().unwrap();
        match records.get_mut(&key) {
            Some(existing) => *existing = record.clone(),
            None => return Err(StoreError::NotFound(format!("{}/{}", key.0, key.1))),
        }
        self.wrote();
        Ok(())
    }

    fn records_for_user(&self, user_id: &UserId) -> Result<Vec<VerificationRecord>, StoreError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|((user, _), _)| user == user_id.as_str())
            .map(|(_, record)| record.clone())
            .collect())
    }
}

impl ProfileStore for NullStore {
    fn get_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.profiles.lock().unwrap().get(user_id.as_str()).cloned())
    }

    fn put_profile(&self, profile: &UserProfile) -> Result<(), StoreError> {
        self.begin_write()?;
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.user_id.to_string(), profile.clone());
        self.wrote();
        Ok(())
    }

    fn create_profile(&self, profile: &UserProfile) -> Result<bool, StoreError> {
        self.begin_write()?;
        let mut profiles = self.profiles.lock().unwrap();
        if profiles.contains_key(profile.user_id.as_str()) {
            return Ok(false);
        }
        profiles.insert(profile.user_id.to_string(), profile.clone());
        self.wrote();
        Ok(true)
    }

    fn update_profile(
        &self,
        user_id: &UserId,
        change: &ProfileChange,
    ) -> Result<UserProfile, StoreError> {
        self.begin_write()?;
        let mut profiles = self.profiles.lock().unwrap();
        let profile = profiles
            .get_mut(user_id.as_str())
            .ok_or_else(|| StoreError::NotFound(format!("profile {user_id}")))?;
        profile.apply(change);
        let updated = profile.clone();
        self.wrote();
        Ok(updated)
    }
}

impl DeviceTokenStore for NullStore {
    fn register_token(&self, user_id: &UserId, token: &str) -> Result<(), StoreError> {
        self.begin_write()?;
        let mut tokens = self.tokens.lock().unwrap();
        let list = tokens.entry(user_id.to_string()).or_default();
        if !list.iter().any(|t| t == token) {
            list.push(token.to_string());
        }
        self.wrote();
        Ok(())
    }

    fn remove_token(&self, user_id: &UserId, token: &str) -> Result<(), StoreError> {
        self.begin_write()?;
        if let Some(list) = self.tokens.lock().unwrap().get_mut(user_id.as_str()) {
            list.retain(|t| t != token);
        }
        self.wrote();
        Ok(())
    }

    fn tokens_for(&self, user_id: &UserId) -> Result<Vec<String>, StoreError> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .get(user_id.as_str())
            .cloned()
            .unwrap_or_default())
    }
}

impl ThreadStore for NullStore {
    fn add_participant(&self, thread_id: &ThreadId, user_id: &UserId) -> Result<(), StoreError> {
        self.begin_write()?;
        self.threads
            .lock()
            .unwrap()
            .entry(thread_id.to_string())
            .or_default()
            .insert(user_id.to_string());
        self.wrote();
        Ok(())
    }

    fn participants(&self, thread_id: &ThreadId) -> Result<Vec<UserId>, StoreError> {
        let threads = self.threads.lock().unwrap();
        let Some(members) = threads.get(thread_id.as_str()) else {
            return Ok(Vec::new());
        };
        members
            .iter()
            .map(|raw| UserId::new(raw.as_str()).map_err(|e| StoreError::Serialization(e.to_string())))
            .collect()
    }
}
