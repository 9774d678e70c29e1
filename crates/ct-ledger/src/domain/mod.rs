//! # Domain Module
//!
//! Core domain types for the confidential telemetry ledger: roles, periods,
//! encrypted readings and the capability grant table.

pub mod access;
pub mod entities;
pub mod errors;
pub mod events;
pub mod invariants;
pub mod periods;
pub mod store;
pub mod value_objects;

pub use access::AccessRegistry;
pub use entities::*;
pub use errors::*;
pub use events::LedgerEvent;
pub use invariants::*;
pub use periods::PeriodManager;
pub use store::{EncryptedStore, GrantTable};
pub use value_objects::*;
