//! HTTP/JSON boundary for the verification service.
//!
//! Provides endpoints for:
//! - Public credential verification
//! - The admin review queue (list, approve, reject)
//! - Direct registry insertion and listing
//! - Health

pub mod error;
pub mod handlers;
pub mod server;

pub use error::RpcError;
pub use handlers::{AppState, DynStore};
pub use server::{router, RpcServer};
