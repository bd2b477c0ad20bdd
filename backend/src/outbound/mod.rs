//! Outbound adapters implementing the driven ports.
//!
//! - [`memory`]: in-process store for tests and single-node development.
//! - [`persistence`]: PostgreSQL via Diesel.
//! - [`notifier`]: confirmation code delivery.

pub mod memory;
pub mod notifier;
pub mod persistence;
