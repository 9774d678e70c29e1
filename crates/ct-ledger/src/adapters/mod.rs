//! # Adapters Module
//!
//! Reference implementations of the outbound ports.

pub mod attestation;
pub mod event_bus;
pub mod fhe_runtime;
pub mod time;

pub use attestation::Ed25519AttestationVerifier;
pub use event_bus::{InMemoryEventBus, DEFAULT_CHANNEL_CAPACITY};
pub use fhe_runtime::InMemoryFheRuntime;
pub use time::ManualTimeSource;
