//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).

mod domain;

pub use domain::{base_time, fraudulent, located, transaction};
