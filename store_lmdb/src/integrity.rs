//! LMDB database integrity checks.
//!
//! Run on startup (and by `barcheck-daemon check-db`) to detect corruption
//! before the service begins accepting requests.

use heed::types::Bytes;

use barcheck_types::LawyerRecord;

use crate::environment::{
    decode, DB_LAWYERS, DB_LAWYERS_BY_LETTER_ID, DB_LAWYERS_BY_NATIONAL_ID, DB_META, DB_REQUESTS,
};
use crate::keys::{decode_id, LAST_LAWYER_ID, LAST_REQUEST_ID};
use crate::{LmdbEnvironment, LmdbError};

/// Summary of an integrity check run.
#[derive(Debug, Default)]
pub struct IntegrityReport {
    pub databases_checked: u32,
    pub total_entries: u64,
    pub errors: Vec<String>,
}

impl IntegrityReport {
    /// Returns `true` if no errors were detected.
    pub fn is_healthy(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Database names that we expect to exist in a valid environment.
const EXPECTED_DATABASES: &[&str] = &[
    DB_LAWYERS,
    DB_LAWYERS_BY_NATIONAL_ID,
    DB_LAWYERS_BY_LETTER_ID,
    DB_REQUESTS,
    DB_META,
];

impl LmdbEnvironment {
    /// Check database integrity.
    ///
    /// Counts every expected database, then cross-checks the registry against
    /// both identifier indexes and the id counters. Problems are collected in
    /// the report rather than causing a hard error.
    pub fn check_integrity(&self) -> Result<IntegrityReport, LmdbError> {
        let mut report = IntegrityReport::default();
        let rtxn = self.env.read_txn()?;

        for &db_name in EXPECTED_DATABASES {
            match self.env.open_database::<Bytes, Bytes>(&rtxn, Some(db_name)) {
                Ok(Some(db)) => {
                    report.databases_checked += 1;
                    match db.len(&rtxn) {
                        Ok(count) => report.total_entries += count,
                        Err(e) => report.errors.push(format!("{db_name}: failed to count: {e}")),
                    }
                }
                Ok(None) => report.errors.push(format!("{db_name}: missing")),
                Err(e) => report.errors.push(format!("{db_name}: failed to open: {e}")),
            }
        }

        let last_lawyer = self.read_counter(&rtxn, LAST_LAWYER_ID)?;
        let last_request = self.read_counter(&rtxn, LAST_REQUEST_ID)?;

        let mut lawyers = 0u64;
        for entry in self.lawyers_db.iter(&rtxn)? {
            let (key, val) = entry?;
            lawyers += 1;
            let id = decode_id(key);
            let record = match decode::<LawyerRecord>(val) {
                Ok(record) => record,
                Err(e) => {
                    report.errors.push(format!("lawyer {id:?}: undecodable: {e}"));
                    continue;
                }
            };
            if id != Some(record.id.get()) {
                report
                    .errors
                    .push(format!("lawyer {}: stored under key {id:?}", record.id));
            }
            if record.id.get() > last_lawyer {
                report.errors.push(format!(
                    "lawyer {}: id beyond counter {last_lawyer}",
                    record.id
                ));
            }
            let nid_target = self
                .national_id_index
                .get(&rtxn, record.national_id.as_str().as_bytes())?
                .and_then(decode_id);
            if nid_target != Some(record.id.get()) {
                report
                    .errors
                    .push(format!("lawyer {}: national ID index mismatch", record.id));
            }
            let lid_target = self
                .letter_id_index
                .get(&rtxn, record.letter_id.as_str().as_bytes())?
                .and_then(decode_id);
            if lid_target != Some(record.id.get()) {
                report
                    .errors
                    .push(format!("lawyer {}: letter ID index mismatch", record.id));
            }
        }

        for (name, index) in [
            (DB_LAWYERS_BY_NATIONAL_ID, &self.national_id_index),
            (DB_LAWYERS_BY_LETTER_ID, &self.letter_id_index),
        ] {
            let len = index.len(&rtxn)?;
            if len != lawyers {
                report
                    .errors
                    .push(format!("{name}: {len} entries for {lawyers} lawyers"));
            }
        }

        for entry in self.requests_db.iter(&rtxn)? {
            let (key, _val) = entry?;
            match decode_id(key) {
                Some(id) if id <= last_request => {}
                other => report
                    .errors
                    .push(format!("request key {other:?} beyond counter {last_request}")),
            }
        }

        if report.is_healthy() {
            tracing::debug!(
                databases = report.databases_checked,
                entries = report.total_entries,
                "integrity check passed"
            );
        } else {
            tracing::warn!(errors = report.errors.len(), "integrity check found problems");
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barcheck_store::{RegistryStore, RequestStore};
    use barcheck_types::{LetterId, NationalId, NewLawyer, Timestamp};

    #[test]
    fn fresh_environment_is_healthy() {
        let dir = tempfile::tempdir().unwrap();
        let env = LmdbEnvironment::open(dir.path(), 16 * 1024 * 1024).unwrap();
        let report = env.check_integrity().unwrap();
        assert!(report.is_healthy(), "{:?}", report.errors);
        assert_eq!(report.databases_checked, EXPECTED_DATABASES.len() as u32);
    }

    #[test]
    fn populated_environment_is_healthy() {
        let dir = tempfile::tempdir().unwrap();
        let env = LmdbEnvironment::open(dir.path(), 16 * 1024 * 1024).unwrap();
        let nid = NationalId::parse("12345-1234567-1").unwrap();
        let lid = LetterId::parse("LTR-12345").unwrap();
        env.insert_lawyer(NewLawyer::new(nid.clone(), lid.clone(), "A"), Timestamp::new(1))
            .unwrap();
        env.insert_request(&nid, &LetterId::parse("LTR-00001").unwrap(), Timestamp::new(2))
            .unwrap();
        let report = env.check_integrity().unwrap();
        assert!(report.is_healthy(), "{:?}", report.errors);
        // 1 lawyer + 2 index entries + 1 request + schema version + 2 counters
        assert_eq!(report.total_entries, 7);
    }

    #[test]
    fn dangling_index_entry_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let env = LmdbEnvironment::open(dir.path(), 16 * 1024 * 1024).unwrap();
        {
            let mut wtxn = env.env.write_txn().unwrap();
            env.national_id_index
                .put(&mut wtxn, b"99999-9999999-9", &42u64.to_be_bytes())
                .unwrap();
            wtxn.commit().unwrap();
        }
        let report = env.check_integrity().unwrap();
        assert!(!report.is_healthy());
    }
}
