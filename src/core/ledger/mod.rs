//! # Ledger Module
//!
//! Durable, append-only record of every capture-time change.
//!
//! ## Guarantees
//! - Rows are only ever appended, never updated or deleted
//! - A path with at least one `changed` row is never corrected again
//! - Each append is committed on its own, so an interrupted run leaves a
//!   consistent ledger up to the last completed file
//!
//! ## Backends
//! - `SqliteLedger` - Persistent storage using SQLite
//! - `InMemoryLedger` - For testing

mod memory;
mod sqlite;
mod traits;
mod types;

pub use memory::InMemoryLedger;
pub use sqlite::SqliteLedger;
pub use traits::ChangeLedger;
pub use types::{ChangeStatus, LedgerEntry};

/// Default ledger file, created in the working directory
pub const DEFAULT_LEDGER_FILE: &str = "_file_updates.db";
