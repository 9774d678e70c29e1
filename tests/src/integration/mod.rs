//! # Integration Flows
//!
//! Full ledger flows through the in-memory FHE runtime acting as both the
//! encryption backend and the decryption oracle.

pub mod lifecycle;
