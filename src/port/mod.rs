//! Ports: trait seams between the engine and its external collaborators.

pub mod store;

pub use store::{AlertStore, TransactionStore};
