//! Financial audit trail
//!
//! Append-only, hash-chained records for every money-moving event. Entries
//! are never mutated or deleted; the chain can be verified end to end.

pub mod storage;
pub mod types;

pub use storage::{AuditStorage, AuditStorageError};
pub use types::{AuditAction, AuditChainBreak, AuditChainVerification, AuditEntry, AuditQuery};
