//! # Application Module
//!
//! The ledger service orchestrating the domain and outbound ports.

pub mod service;

pub use service::{LedgerPorts, LedgerService, LedgerState, SNAPSHOT_FORMAT_VERSION};
