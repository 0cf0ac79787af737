//! Abstract storage traits for the lawyer registry and review queue.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The verification engine depends only on the traits.
//!
//! Writes that must not interleave (the uniqueness check-then-insert, and
//! the approve/reject transitions) are single trait methods so that each
//! backend can run them as one atomic unit.

pub mod error;
pub mod registry;
pub mod request;
pub mod review;

pub use error::StoreError;
pub use registry::RegistryStore;
pub use request::RequestStore;
pub use review::ReviewStore;
