//! LMDB storage backend.
//!
//! Implements all storage traits from `barcheck-store` using the `heed` LMDB
//! bindings. The registry, its two identifier indexes, the request queue and
//! the id counters live in one environment, so every compound operation runs
//! inside a single write transaction. LMDB admits one writer at a time, which
//! makes each check-then-insert atomic without any extra locking.

pub mod environment;
pub mod error;
pub mod integrity;
mod keys;
pub mod registry;
pub mod request;
pub mod review;

pub use environment::{LmdbEnvironment, DEFAULT_MAP_SIZE};
pub use error::LmdbError;
pub use integrity::IntegrityReport;
