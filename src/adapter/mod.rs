//! Store adapters: pluggable persistence backends behind the port traits.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::{SqliteAlertStore, SqliteTransactionStore};
