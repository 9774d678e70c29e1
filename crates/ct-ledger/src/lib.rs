//! # CT Ledger
//!
//! Confidential telemetry ledger: reporters submit encrypted five-field
//! readings per period, and reviewers obtain per-period aggregates through
//! an external decryption oracle without any individual value being
//! decrypted inside the ledger.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Core protocol
//!
//! | Step | Operation | Effect |
//! |------|-----------|--------|
//! | 1 | `start_period` | New period id, zeroed encrypted summary |
//! | 2 | `submit` | Alerts on plaintext, five handles stored and granted |
//! | 3 | `request_summary` | After expiry: roster handles sent to the oracle |
//! | 4 | `on_decrypted` | Proof checked, floor averages re-encrypted, period finalized |
//!
//! A new period cannot start while step 3 is waiting on step 4, and period
//! ids are never reused, so a callback only ever touches its own period.
//!
//! ## Capability grants
//!
//! Who may request decryption of which handle is an append-only
//! [`GrantTable`] owned by the ledger and passed to the oracle with every
//! request. Reporters can always read back their own values; reviewers gain
//! access to a reading only through emergency access, which is permanent.
//!
//! ## Module Structure
//!
//! ```text
//! ct-ledger/
//! ├── domain/          # Periods, readings, grants, roles, events, errors
//! ├── algorithms/      # Alert evaluation, aggregation reduction
//! ├── ports/           # ConfidentialLedgerApi, CipherBackend, DecryptionOracle
//! ├── adapters/        # In-memory FHE runtime, Ed25519 verifier, event bus
//! └── application/     # LedgerService
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{
    Ed25519AttestationVerifier, InMemoryEventBus, InMemoryFheRuntime, ManualTimeSource,
};
pub use algorithms::{evaluate, floor_average, reduce_batch, AlertThresholds, Band};
pub use application::{LedgerPorts, LedgerService, SNAPSHOT_FORMAT_VERSION};
pub use config::{LedgerConfig, DEFAULT_AGGREGATED_FIELDS, DEFAULT_PERIOD_DURATION_SECS};
pub use domain::{
    AccessRegistry, Address, AggregateSummary, AlertKind, CipherHandle, DecryptionProof,
    DecryptionResponse, EncryptedStore, ErrorKind, Field, FieldValues, GrantTable, LedgerError,
    LedgerEvent, LedgerResult, Period, PeriodHistory, PeriodId, PeriodInfo, PeriodManager,
    PeriodPhase, PendingDecryptionRequest, Reading, ReportStatus, RequestId, Role, Timestamp,
    FIELD_COUNT,
};
pub use ports::{
    AttestationVerifier, CipherBackend, ConfidentialLedgerApi, DecryptionOracle, EventPublisher,
    SubmissionReceipt, SummaryRequestOutcome, SystemTimeSource, TimeSource,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
