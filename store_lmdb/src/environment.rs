//! LMDB environment setup and the transaction-scoped helpers shared by the
//! store implementations.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions, RoTxn, RwTxn};
use serde::de::DeserializeOwned;

use barcheck_store::StoreError;
use barcheck_types::{LawyerId, LawyerRecord, NewLawyer, Timestamp, VerificationRequest};

use crate::keys::{decode_id, id_key, SCHEMA_VERSION};
use crate::LmdbError;

/// On-disk layout version written on first open.
pub const SCHEMA_VERSION_CURRENT: u32 = 1;

/// Default map size: 256 MiB.
pub const DEFAULT_MAP_SIZE: usize = 256 * 1024 * 1024;

pub(crate) const DB_LAWYERS: &str = "lawyers";
pub(crate) const DB_LAWYERS_BY_NATIONAL_ID: &str = "lawyers_by_national_id";
pub(crate) const DB_LAWYERS_BY_LETTER_ID: &str = "lawyers_by_letter_id";
pub(crate) const DB_REQUESTS: &str = "requests";
pub(crate) const DB_META: &str = "meta";

const MAX_DBS: u32 = 8;

/// Wraps the LMDB environment and all database handles.
///
/// Implements [`RegistryStore`](barcheck_store::RegistryStore),
/// [`RequestStore`](barcheck_store::RequestStore) and
/// [`ReviewStore`](barcheck_store::ReviewStore).
pub struct LmdbEnvironment {
    pub(crate) env: Arc<Env>,
    /// `id_be -> bincode(LawyerRecord)`
    pub(crate) lawyers_db: Database<Bytes, Bytes>,
    /// `national_id -> id_be`
    pub(crate) national_id_index: Database<Bytes, Bytes>,
    /// `letter_id -> id_be`
    pub(crate) letter_id_index: Database<Bytes, Bytes>,
    /// `id_be -> bincode(VerificationRequest)`
    pub(crate) requests_db: Database<Bytes, Bytes>,
    /// Id counters and the schema version.
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given directory.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment is opened once per process for this path and
        // the memory map is never handed out beyond heed's borrow-checked
        // transactions.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let lawyers_db = env.create_database(&mut wtxn, Some(DB_LAWYERS))?;
        let national_id_index = env.create_database(&mut wtxn, Some(DB_LAWYERS_BY_NATIONAL_ID))?;
        let letter_id_index = env.create_database(&mut wtxn, Some(DB_LAWYERS_BY_LETTER_ID))?;
        let requests_db = env.create_database(&mut wtxn, Some(DB_REQUESTS))?;
        let meta_db: Database<Bytes, Bytes> = env.create_database(&mut wtxn, Some(DB_META))?;

        let stored = meta_db.get(&wtxn, SCHEMA_VERSION)?.map(<[u8]>::to_vec);
        match stored {
            None => {
                meta_db.put(&mut wtxn, SCHEMA_VERSION, &SCHEMA_VERSION_CURRENT.to_le_bytes())?;
            }
            Some(bytes) => {
                let version = <[u8; 4]>::try_from(bytes.as_slice())
                    .map(u32::from_le_bytes)
                    .map_err(|_| {
                        LmdbError::Corruption("schema_version has unexpected byte length".into())
                    })?;
                if version != SCHEMA_VERSION_CURRENT {
                    return Err(LmdbError::Corruption(format!(
                        "unsupported schema version {version}, expected {SCHEMA_VERSION_CURRENT}"
                    )));
                }
            }
        }
        wtxn.commit()?;

        tracing::info!(path = %path.display(), map_size, "opened LMDB environment");

        Ok(Self {
            env: Arc::new(env),
            lawyers_db,
            national_id_index,
            letter_id_index,
            requests_db,
            meta_db,
        })
    }

    /// Open with [`DEFAULT_MAP_SIZE`].
    pub fn open_default(path: &Path) -> Result<Self, LmdbError> {
        Self::open(path, DEFAULT_MAP_SIZE)
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    // ── Transaction-scoped helpers ──────────────────────────────────────

    pub(crate) fn read_lawyer(
        &self,
        txn: &RoTxn,
        id: u64,
    ) -> Result<Option<LawyerRecord>, LmdbError> {
        self.lawyers_db
            .get(txn, &id_key(id))?
            .map(decode::<LawyerRecord>)
            .transpose()
    }

    /// Follow an identifier index to its record.
    pub(crate) fn read_lawyer_via(
        &self,
        txn: &RoTxn,
        index: &Database<Bytes, Bytes>,
        key: &[u8],
    ) -> Result<Option<LawyerRecord>, LmdbError> {
        let Some(id_bytes) = index.get(txn, key)? else {
            return Ok(None);
        };
        let id = decode_id(id_bytes)
            .ok_or_else(|| LmdbError::Corruption("index entry is not an 8-byte id".into()))?;
        match self.read_lawyer(txn, id)? {
            Some(record) => Ok(Some(record)),
            None => Err(LmdbError::Corruption(format!(
                "index points at missing lawyer {id}"
            ))),
        }
    }

    pub(crate) fn read_request(
        &self,
        txn: &RoTxn,
        id: u64,
    ) -> Result<Option<VerificationRequest>, LmdbError> {
        self.requests_db
            .get(txn, &id_key(id))?
            .map(decode::<VerificationRequest>)
            .transpose()
    }

    pub(crate) fn read_counter(&self, txn: &RoTxn, key: &[u8]) -> Result<u64, LmdbError> {
        match self.meta_db.get(txn, key)? {
            None => Ok(0),
            Some(bytes) => decode_id(bytes).ok_or_else(|| {
                LmdbError::Corruption(format!(
                    "counter {} has unexpected byte length",
                    String::from_utf8_lossy(key)
                ))
            }),
        }
    }

    /// Bump a counter and return the new value.
    pub(crate) fn next_id(&self, wtxn: &mut RwTxn, key: &[u8]) -> Result<u64, LmdbError> {
        let next = self.read_counter(wtxn, key)? + 1;
        self.meta_db.put(wtxn, key, &id_key(next))?;
        Ok(next)
    }

    /// Check both identifier indexes and insert the record with its index
    /// entries, all inside the caller's write transaction.
    pub(crate) fn insert_lawyer_in(
        &self,
        wtxn: &mut RwTxn,
        lawyer: NewLawyer,
        created_at: Timestamp,
    ) -> Result<LawyerRecord, StoreError> {
        let nid_key = lawyer.national_id.as_str().as_bytes().to_vec();
        let lid_key = lawyer.letter_id.as_str().as_bytes().to_vec();

        if self
            .national_id_index
            .get(wtxn, &nid_key)
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Err(StoreError::Duplicate(format!(
                "national ID {} already registered",
                lawyer.national_id
            )));
        }
        if self
            .letter_id_index
            .get(wtxn, &lid_key)
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Err(StoreError::Duplicate(format!(
                "letter ID {} already registered",
                lawyer.letter_id
            )));
        }

        let id = self.next_id(wtxn, crate::keys::LAST_LAWYER_ID)?;
        let record = lawyer.into_record(LawyerId::new(id), created_at);
        let bytes = bincode::serialize(&record).map_err(LmdbError::from)?;
        let key = id_key(id);

        self.lawyers_db
            .put(wtxn, &key, &bytes)
            .map_err(LmdbError::from)?;
        self.national_id_index
            .put(wtxn, &nid_key, &key)
            .map_err(LmdbError::from)?;
        self.letter_id_index
            .put(wtxn, &lid_key, &key)
            .map_err(LmdbError::from)?;
        Ok(record)
    }

    pub(crate) fn put_request_in(
        &self,
        wtxn: &mut RwTxn,
        request: &VerificationRequest,
    ) -> Result<(), LmdbError> {
        let bytes = bincode::serialize(request)?;
        self.requests_db
            .put(wtxn, &id_key(request.id.get()), &bytes)?;
        Ok(())
    }
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, LmdbError> {
    Ok(bincode::deserialize(bytes)?)
}
