//! # CT Ledger Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Wired ledger + in-memory oracle harness
//! └── integration/      # End-to-end period flows
//!     ├── lifecycle.rs  # Start, submit, aggregate, read back
//!     └── adversarial.rs# Races, forged proofs, replays, capability abuse
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ct-tests
//! cargo test -p ct-tests integration::adversarial::
//!
//! # Benchmarks
//! cargo bench -p ct-tests
//! ```

#![allow(dead_code)]

pub mod fixtures;
pub mod integration;
