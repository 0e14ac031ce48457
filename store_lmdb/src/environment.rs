//! LMDB environment setup.

use std::path::Path;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::LmdbError;

/// Number of named databases opened by [`LmdbStore::open`].
const MAX_DBS: u32 = 8;

/// Default map size: 1 GiB of address space.
pub const DEFAULT_MAP_SIZE: usize = 1024 * 1024 * 1024;

/// Wraps the LMDB environment and all database handles.
#[derive(Clone)]
pub struct LmdbStore {
    pub(crate) env: Env,
    pub(crate) sessions_db: Database<Bytes, Bytes>,
    pub(crate) records_db: Database<Bytes, Bytes>,
    pub(crate) profiles_db: Database<Bytes, Bytes>,
    pub(crate) device_tokens_db: Database<Bytes, Bytes>,
    pub(crate) thread_members_db: Database<Bytes, Bytes>,
}

impl LmdbStore {
    /// Open or create an LMDB environment at the given directory.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment is opened once per process for this path and
        // the backing file is not truncated or replaced while it is mapped.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let sessions_db = env.create_database(&mut wtxn, Some("verification_sessions"))?;
        let records_db = env.create_database(&mut wtxn, Some("verification_records"))?;
        let profiles_db = env.create_database(&mut wtxn, Some("profiles"))?;
        let device_tokens_db = env.create_database(&mut wtxn, Some("device_tokens"))?;
        let thread_members_db = env.create_database(&mut wtxn, Some("dm_participants"))?;
        wtxn.commit()?;

        tracing::info!(path = %path.display(), map_size, "opened LMDB store");

        Ok(Self {
            env,
            sessions_db,
            records_db,
            profiles_db,
            device_tokens_db,
            thread_members_db,
        })
    }
}
